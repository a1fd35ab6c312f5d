use std::sync::atomic::{AtomicUsize, Ordering};

use crate::encode::{encode_png, upload_name};
use crate::engine::Poster;

/// Receives an encoded PNG and returns its public URL.
pub trait ImageHost: Send + Sync {
    fn upload(&self, png: &[u8], name: &str) -> anyhow::Result<String>;
}

/// Round-robin pool of API keys.
#[derive(Default)]
pub struct KeyRing {
    keys: Vec<String>,
    next: AtomicUsize,
}

impl std::fmt::Debug for KeyRing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyRing").field("keys", &self.keys.len()).finish()
    }
}

impl KeyRing {
    /// Blank keys are dropped.
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys
                .into_iter()
                .map(Into::into)
                .map(|k: String| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect(),
            next: AtomicUsize::new(0),
        }
    }

    /// Comma-separated list.
    pub fn parse(list: &str) -> Self {
        Self::new(list.split(','))
    }

    /// `IMGBB_API_KEYS` (comma-separated), else `IMGBB_API_KEY`.
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub(crate) fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let ring = get("IMGBB_API_KEYS")
            .map(|v| Self::parse(&v))
            .unwrap_or_default();
        if !ring.is_empty() {
            return ring;
        }
        get("IMGBB_API_KEY").map(|v| Self::parse(&v)).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The next key in rotation.
    pub fn next_key(&self) -> Option<&str> {
        if self.keys.is_empty() {
            return None;
        }
        let i = self.next.fetch_add(1, Ordering::Relaxed) % self.keys.len();
        Some(self.keys[i].as_str())
    }
}

#[cfg(feature = "net")]
pub use imgbb::ImgbbHost;

#[cfg(feature = "net")]
mod imgbb {
    use std::time::Duration;

    use anyhow::Context as _;

    use super::{ImageHost, KeyRing};
    use crate::encode::encode_base64;

    const ENDPOINT: &str = "https://api.imgbb.com/1/upload";
    const TIMEOUT: Duration = Duration::from_secs(30);

    #[derive(serde::Deserialize)]
    struct Response {
        #[serde(default)]
        success: bool,
        data: Option<Data>,
    }

    #[derive(serde::Deserialize)]
    struct Data {
        url: String,
    }

    /// ImgBB upload API.
    #[derive(Debug)]
    pub struct ImgbbHost {
        keys: KeyRing,
        endpoint: String,
        client: reqwest::blocking::Client,
    }

    impl ImgbbHost {
        pub fn new(keys: KeyRing) -> anyhow::Result<Self> {
            let client = reqwest::blocking::Client::builder()
                .timeout(TIMEOUT)
                .build()
                .context("build imgbb http client")?;
            Ok(Self {
                keys,
                endpoint: ENDPOINT.to_string(),
                client,
            })
        }

        pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
            self.endpoint = endpoint.into();
            self
        }
    }

    impl ImageHost for ImgbbHost {
        fn upload(&self, png: &[u8], name: &str) -> anyhow::Result<String> {
            let key = self.keys.next_key().context("no imgbb api key configured")?;
            let image = encode_base64(png);
            let resp: Response = self
                .client
                .post(&self.endpoint)
                .form(&[("key", key), ("image", image.as_str()), ("name", name)])
                .send()
                .context("imgbb request")?
                .error_for_status()
                .context("imgbb http status")?
                .json()
                .context("imgbb response body")?;
            match resp.data {
                Some(d) if resp.success => Ok(d.url),
                _ => anyhow::bail!("imgbb reported failure"),
            }
        }
    }
}

/// Encode and upload `poster`. Failures are logged and become `None`; no retries.
pub fn publish(poster: &Poster, host: &dyn ImageHost) -> Option<String> {
    let png = match encode_png(&poster.image) {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(error = %e, "poster encode failed");
            return None;
        }
    };
    match host.upload(&png, &upload_name(&poster.title)) {
        Ok(url) => {
            tracing::info!(%url, bytes = png.len(), "poster uploaded");
            Some(url)
        }
        Err(e) => {
            tracing::warn!(error = %e, "poster upload failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[test]
    fn keyring_rotates_and_skips_blanks() {
        let ring = KeyRing::parse("a, ,b,");
        assert_eq!(ring.len(), 2);
        assert_eq!(ring.next_key(), Some("a"));
        assert_eq!(ring.next_key(), Some("b"));
        assert_eq!(ring.next_key(), Some("a"));
        assert_eq!(KeyRing::default().next_key(), None);
    }

    #[test]
    fn keyring_env_prefers_list() {
        let env: HashMap<&str, &str> = [("IMGBB_API_KEYS", "x,y"), ("IMGBB_API_KEY", "z")].into();
        let ring = KeyRing::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(ring.len(), 2);

        let env: HashMap<&str, &str> = [("IMGBB_API_KEYS", " "), ("IMGBB_API_KEY", "z")].into();
        let ring = KeyRing::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(ring.next_key(), Some("z"));
    }

    struct Recording(Mutex<Vec<(usize, String)>>);
    impl ImageHost for Recording {
        fn upload(&self, png: &[u8], name: &str) -> anyhow::Result<String> {
            self.0.lock().unwrap().push((png.len(), name.to_string()));
            Ok("https://img.example/1.png".into())
        }
    }

    struct Failing;
    impl ImageHost for Failing {
        fn upload(&self, _: &[u8], _: &str) -> anyhow::Result<String> {
            anyhow::bail!("503")
        }
    }

    fn poster() -> Poster {
        Poster {
            title: "t".into(),
            image: image::RgbImage::new(4, 4),
            profile: crate::topic::TopicProfile::generic(),
            tier: crate::background::BackgroundTier::Procedural,
            template: crate::topic::TemplateKind::HeroCard,
        }
    }

    #[test]
    fn publish_returns_url_or_none() {
        let host = Recording(Mutex::new(Vec::new()));
        assert_eq!(publish(&poster(), &host).as_deref(), Some("https://img.example/1.png"));
        let calls = host.0.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].0 > 8);
        assert_eq!(calls[0].1, upload_name("t"));

        assert_eq!(publish(&poster(), &Failing), None);
    }
}
