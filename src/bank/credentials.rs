use std::path::PathBuf;

use crate::config::ConfigError;

pub(crate) const ENV_IDENTITY: &str = "BANKFEED_IDENTITY";
pub(crate) const ENV_SECRET: &str = "BANKFEED_SECRET";
pub(crate) const ENV_CERT_PATH: &str = "BANKFEED_CERT_PATH";

/// Login for the banking API: account identity, password and the path of
/// the PKCS#12 client certificate.
#[derive(Clone)]
pub(crate) struct Credentials {
    pub(crate) identity: String,
    pub(crate) secret: String,
    pub(crate) cert_path: PathBuf,
}

impl Credentials {
    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &'static str| lookup(key).filter(|v| !v.is_empty());

        let found = (read(ENV_IDENTITY), read(ENV_SECRET), read(ENV_CERT_PATH));
        let (identity, secret, cert_path) = match found {
            (Some(identity), Some(secret), Some(cert_path)) => {
                (identity, secret, PathBuf::from(cert_path))
            }
            (identity, secret, cert_path) => {
                let missing = [
                    (ENV_IDENTITY, identity.is_none()),
                    (ENV_SECRET, secret.is_none()),
                    (ENV_CERT_PATH, cert_path.is_none()),
                ]
                .into_iter()
                .filter(|(_, absent)| *absent)
                .map(|(key, _)| key)
                .collect();
                return Err(ConfigError::MissingCredentials(missing));
            }
        };

        if !cert_path.exists() {
            return Err(ConfigError::CertificateNotFound(cert_path));
        }

        Ok(Self {
            identity,
            secret,
            cert_path,
        })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("identity", &self.identity)
            .field("secret", &"***")
            .field("cert_path", &self.cert_path)
            .finish()
    }
}
