use std::fmt::Debug;

const DEFAULT_LOCATION: &str = "us-central1";

/// Builder for [`VertexConfig`].
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct VertexConfigBuilder {
    project: String,
    access_token: String,
    location: Option<String>,
    base_url: Option<String>,
}

impl VertexConfigBuilder {
    /// Creates a builder for the given Google Cloud project, authorized by
    /// an OAuth2 access token (e.g. `gcloud auth print-access-token`).
    #[inline]
    pub fn new<P: Into<String>, T: Into<String>>(
        project: P,
        access_token: T,
    ) -> Self {
        Self {
            project: project.into(),
            access_token: access_token.into(),
            location: None,
            base_url: None,
        }
    }

    /// Sets the region to use. Defaults to `us-central1`.
    #[inline]
    pub fn with_location<S: Into<String>>(mut self, location: S) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Sets a custom base URL. Defaults to the regional endpoint of the
    /// configured location.
    #[inline]
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Builds the configuration.
    #[inline]
    pub fn build(self) -> VertexConfig {
        let location =
            self.location.unwrap_or_else(|| DEFAULT_LOCATION.to_string());
        let base_url = self.base_url.unwrap_or_else(|| {
            format!("https://{location}-aiplatform.googleapis.com/v1")
        });
        VertexConfig {
            project: self.project,
            access_token: self.access_token,
            location,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }
}

impl Debug for VertexConfigBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VertexConfigBuilder")
            .field("project", &self.project)
            .field("access_token", &"<deducted>")
            .field("location", &self.location)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Configuration for the Vertex AI provider.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct VertexConfig {
    pub(crate) project: String,
    pub(crate) access_token: String,
    pub(crate) location: String,
    pub(crate) base_url: String,
}

impl VertexConfig {
    /// Returns the URL of `method` on the given publisher model.
    pub(crate) fn model_url(&self, model_name: &str, method: &str) -> String {
        format!(
            "{}/projects/{}/locations/{}/publishers/google/models/{}:{}",
            self.base_url, self.project, self.location, model_name, method
        )
    }
}

impl Debug for VertexConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VertexConfig")
            .field("project", &self.project)
            .field("access_token", &"<deducted>")
            .field("location", &self.location)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = VertexConfigBuilder::new("my-project", "secret").build();
        assert_eq!(config.location, "us-central1");
        assert_eq!(
            config.model_url("chat-bison", "predict"),
            "https://us-central1-aiplatform.googleapis.com/v1/projects/\
             my-project/locations/us-central1/publishers/google/models/\
             chat-bison:predict"
        );
        assert!(!format!("{config:?}").contains("secret"));
    }

    #[test]
    fn test_custom_endpoint() {
        let config = VertexConfigBuilder::new("p", "t")
            .with_location("europe-west4")
            .with_base_url("http://localhost:8080/v1/")
            .build();
        assert_eq!(
            config.model_url("codechat-bison", "serverStreamingPredict"),
            "http://localhost:8080/v1/projects/p/locations/europe-west4/\
             publishers/google/models/codechat-bison:serverStreamingPredict"
        );
    }
}
