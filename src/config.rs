use time::Duration;

/// Which object-store implementation serves uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Local,
    S3,
}

#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    pub endpoint: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub storage: StorageKind,
    pub upload_dir: String,
    pub s3: S3Config,
    pub sns_topic_arn: Option<String>,
    pub verification_ttl: Duration,
    pub verify_domain: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;

        let storage = match std::env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "local".into())
            .to_lowercase()
            .as_str()
        {
            "local" => StorageKind::Local,
            "s3" => StorageKind::S3,
            other => anyhow::bail!("unsupported STORAGE_BACKEND: {other}"),
        };
        let upload_dir = std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".into());

        let s3 = S3Config {
            bucket: std::env::var("S3_BUCKET").unwrap_or_default(),
            region: std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".into()),
            endpoint: std::env::var("S3_ENDPOINT").ok(),
            access_key: std::env::var("S3_ACCESS_KEY").ok(),
            secret_key: std::env::var("S3_SECRET_KEY").ok(),
        };
        if storage == StorageKind::S3 && s3.bucket.is_empty() {
            anyhow::bail!("S3_BUCKET is required when STORAGE_BACKEND=s3");
        }

        let verification_ttl = Duration::seconds(
            std::env::var("VERIFICATION_TTL_SECS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
        );

        // Verification links point at {environment}.{domain}.
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".into());
        let domain_name = std::env::var("DOMAIN_NAME").unwrap_or_else(|_| "localhost".into());
        let verify_domain = format!("{environment}.{domain_name}");

        Ok(Self {
            database_url,
            storage,
            upload_dir,
            s3,
            sns_topic_arn: std::env::var("SNS_TOPIC_ARN").ok(),
            verification_ttl,
            verify_domain,
        })
    }
}
