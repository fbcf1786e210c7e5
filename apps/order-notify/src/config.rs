use core_config::{AppInfo, FromEnv, app_info, server::ServerConfig};
use domain_order_notifications::TemplateBranding;
use email::SmtpConfig;

pub use core_config::Environment;

/// Application configuration, read once at startup
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub server: ServerConfig,
    pub environment: Environment,
    pub smtp: SmtpConfig,
    pub branding: TemplateBranding,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?; // HOST=0.0.0.0, PORT=8080 unless set
        let smtp = SmtpConfig::from_env()?; // SMTP_HOST is required
        let branding = TemplateBranding::from_env()?;

        Ok(Self {
            app: app_info!(),
            server,
            environment,
            smtp,
            branding,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_without_smtp_host_fails() {
        temp_env::with_vars_unset(["SMTP_HOST"], || {
            let err = Config::from_env().unwrap_err();
            assert!(err.to_string().contains("SMTP_HOST"));
        });
    }

    #[test]
    fn test_from_env_reads_all_sections() {
        temp_env::with_vars(
            [
                ("SMTP_HOST", Some("smtp.example.com")),
                ("SMTP_ENCRYPTION", Some("starttls")),
                ("SMTP_PORT", None),
                ("SMTP_USERNAME", None),
                ("SMTP_PASSWORD", None),
                ("EMAIL_FROM_ADDRESS", Some("orders@example.com")),
                ("PORT", Some("9090")),
                ("COMPANY_NAME", Some("Tasty Bites")),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.app.name, "order_notify");
                assert_eq!(config.server.port, 9090);
                assert_eq!(config.smtp.port, 587);
                assert_eq!(config.branding.company_name, "Tasty Bites");
            },
        );
    }
}
