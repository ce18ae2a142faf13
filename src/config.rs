use crate::error::ConfigError;
use clap::Parser;
use reqwest::Url;

#[derive(Parser, Debug, Clone)]
#[command(name = "blinky-uploader", version, about = "Turn up to three images into an animated image")]
pub struct Config {
    /// Base URL of the animation server (serves /upload and /process).
    #[arg(long, env = "BLINKY_SERVER_URL", default_value = "http://localhost:8080")]
    pub server_url: String,

    /// Log filter directive, e.g. `info` or `blinky_uploader=debug`.
    #[arg(long, env = "BLINKY_LOG", default_value = "info")]
    pub log_level: String,
}

impl Config {
    /// Parses the server URL, making sure endpoint paths join under it.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let mut url =
            Url::parse(self.server_url.trim()).map_err(|e| ConfigError::InvalidServerUrl {
                url: self.server_url.clone(),
                reason: e.to_string(),
            })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme(url.scheme().to_string()));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(server_url: &str) -> Config {
        Config::parse_from(["blinky-uploader", "--server-url", server_url])
    }

    #[test]
    fn defaults_to_local_server() {
        let config = Config::parse_from(["blinky-uploader"]);
        assert_eq!(config.log_level, "info");
        assert_eq!(
            config.base_url().unwrap().as_str(),
            "http://localhost:8080/"
        );
    }

    #[test]
    fn sub_path_keeps_endpoints_underneath() {
        let url = config("https://example.com/blinky").base_url().unwrap();
        assert_eq!(url.join("upload").unwrap().as_str(), "https://example.com/blinky/upload");
    }

    #[test]
    fn rejects_non_http_urls() {
        assert!(matches!(
            config("ftp://example.com").base_url(),
            Err(ConfigError::UnsupportedScheme(scheme)) if scheme == "ftp"
        ));
        assert!(matches!(
            config("not a url").base_url(),
            Err(ConfigError::InvalidServerUrl { .. })
        ));
    }
}
