use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

use crate::config::S3Config;
use crate::error::AppError;

#[derive(Clone)]
pub struct S3Service {
    client: Client,
    pub bucket_name: String,
    endpoint: Option<String>,
    region: String,
}

impl S3Service {
    pub async fn new(config: &S3Config) -> Self {
        let credentials = aws_sdk_s3::config::Credentials::new(
            config.access_key_id.clone(),
            config.secret_access_key.clone(),
            None,
            None,
            "manual_config",
        );

        let region = aws_sdk_s3::config::Region::new(config.region.clone());

        let mut s3_config_builder = aws_sdk_s3::config::Builder::new()
            .behavior_version(aws_sdk_s3::config::BehaviorVersion::latest())
            .region(region)
            .credentials_provider(credentials);

        if let Some(endpoint) = &config.endpoint {
            s3_config_builder = s3_config_builder
                .endpoint_url(endpoint)
                .force_path_style(true);
        }

        let client = Client::from_conf(s3_config_builder.build());

        Self {
            client,
            bucket_name: config.bucket_name.clone(),
            endpoint: config.endpoint.clone(),
            region: config.region.clone(),
        }
    }

    pub async fn put_object(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<(), AppError> {
        self.client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .acl(aws_sdk_s3::types::ObjectCannedAcl::PublicRead)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(key, error = ?e, "S3 upload failed");
                AppError::Storage(format!("Failed to upload file to S3: {}", e))
            })?;

        Ok(())
    }

    pub async fn delete_object(&self, key: &str) -> Result<(), AppError> {
        self.client
            .delete_object()
            .bucket(&self.bucket_name)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(key, error = %e, "S3 delete failed");
                AppError::Storage(format!("Failed to delete file from S3: {}", e))
            })?;

        Ok(())
    }

    pub async fn ensure_bucket_exists(&self) -> Result<(), AppError> {
        if self
            .client
            .head_bucket()
            .bucket(&self.bucket_name)
            .send()
            .await
            .is_err()
        {
            tracing::info!(bucket = %self.bucket_name, "bucket does not exist, creating it");
            self.client
                .create_bucket()
                .bucket(&self.bucket_name)
                .send()
                .await
                .map_err(|e| {
                    tracing::error!(error = ?e, "failed to create bucket");
                    AppError::Storage(format!("Failed to create S3 bucket: {}", e))
                })?;
        }

        self.set_public_policy().await
    }

    async fn set_public_policy(&self) -> Result<(), AppError> {
        let policy = format!(
            r#"{{
                "Version": "2012-10-17",
                "Statement": [
                    {{
                        "Sid": "PublicReadGetObject",
                        "Effect": "Allow",
                        "Principal": "*",
                        "Action": "s3:GetObject",
                        "Resource": "arn:aws:s3:::{}/*"
                    }}
                ]
            }}"#,
            self.bucket_name
        );

        // Some S3-compatible providers reject bucket policies; uploads still work there.
        if let Err(e) = self
            .client
            .put_bucket_policy()
            .bucket(&self.bucket_name)
            .policy(policy)
            .send()
            .await
        {
            tracing::warn!(bucket = %self.bucket_name, error = %e, "failed to set bucket policy");
        }

        Ok(())
    }

    fn base_url(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => format!("{}/{}", endpoint, self.bucket_name),
            None => format!("https://{}.s3.{}.amazonaws.com", self.bucket_name, self.region),
        }
    }

    pub fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url(), key)
    }

    /// Recovers the object key from a URL built by [`S3Service::object_url`].
    pub fn key_from_url(&self, object_url: &str) -> Option<String> {
        if let Some(key) = object_url.strip_prefix(&format!("{}/", self.base_url())) {
            return Some(key.to_string());
        }

        let marker = format!("/{}/", self.bucket_name);
        if let Some(idx) = object_url.find(&marker) {
            return Some(object_url[idx + marker.len()..].to_string());
        }

        url::Url::parse(object_url)
            .ok()
            .map(|parsed| parsed.path().trim_start_matches('/').to_string())
            .filter(|key| !key.is_empty())
    }
}
