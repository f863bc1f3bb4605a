use image::ImageFormat;

use crate::extract::UploadedFile;
use crate::validation::ValidationError;

const ACCEPTED: &str = "must be a file of type: jpeg, png, jpg, gif";

/// What an accepted upload turned out to be.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CheckedImage {
    pub extension: &'static str,
    pub mime_type: &'static str,
}

/// Validates an uploaded image: declared as an image, at most `max_bytes`
/// long, and actually a JPEG, PNG or GIF judging by its content.
pub fn inspect_upload(
    file: &UploadedFile,
    field: &'static str,
    max_bytes: usize,
) -> Result<CheckedImage, ValidationError> {
    if !file.content_type.starts_with("image/") {
        return Err(ValidationError::invalid(field, "must be an image"));
    }

    if file.data.len() > max_bytes {
        return Err(ValidationError::invalid(
            field,
            format!("may not be greater than {} kilobytes", max_bytes / 1024),
        ));
    }

    let format = image::guess_format(&file.data)
        .map_err(|_| ValidationError::invalid(field, ACCEPTED))?;

    match format {
        ImageFormat::Jpeg => Ok(CheckedImage {
            extension: "jpg",
            mime_type: "image/jpeg",
        }),
        ImageFormat::Png => Ok(CheckedImage {
            extension: "png",
            mime_type: "image/png",
        }),
        ImageFormat::Gif => Ok(CheckedImage {
            extension: "gif",
            mime_type: "image/gif",
        }),
        _ => Err(ValidationError::invalid(field, ACCEPTED)),
    }
}
