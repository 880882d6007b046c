//! Amazon S3 (and S3-compatible) [`ObjectStore`].
//!
//! Credentials come from the AWS SDK default provider chain
//! (`AWS_ACCESS_KEY_ID`/`AWS_SECRET_ACCESS_KEY`, `~/.aws` profiles, IMDS,
//! ECS task roles, ...). Nothing is passed explicitly.
//!
//! Setting `endpoint_url` in the config points the client at an
//! S3-compatible service such as Cloudflare R2 or `MinIO`; path-style
//! addressing is forced in that case.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::primitives::ByteStream;
use crime_split_config::SplitConfig;

use crate::{ObjectStore, UploadError};

/// Object store backed by the AWS SDK S3 client.
pub struct S3Store {
    client: aws_sdk_s3::Client,
}

impl S3Store {
    /// Builds a client from the SDK defaults plus the config's region and
    /// endpoint overrides.
    pub async fn from_config(config: &SplitConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let shared = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = &config.endpoint_url {
            log::info!("Using S3 endpoint override {endpoint}");
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self {
            client: aws_sdk_s3::Client::from_conf(builder.build()),
        }
    }

    /// Wraps an already-configured client.
    #[must_use]
    pub const fn from_client(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<(), UploadError> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type("text/csv")
            .send()
            .await
            .map_err(|e| UploadError::Put {
                bucket: bucket.to_string(),
                key: key.to_string(),
                source: Box::new(e),
            })?;
        Ok(())
    }
}
