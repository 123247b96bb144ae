use serde::Deserialize;
use serde::Serialize;

/// Host-side URL history the reconciler writes to and reads back from.
pub trait Router {
    fn push(&mut self, url: &str);
    fn replace(&mut self, url: &str);
    fn current(&self) -> Option<&str>;

    /// Steps back one entry, returning the URL now shown.
    fn back(&mut self) -> Option<&str>;
    fn forward(&mut self) -> Option<&str>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "url", rename_all = "snake_case")]
pub enum RouterOp {
    Push(String),
    Replace(String),
    Back(String),
    Forward(String),
}

impl RouterOp {
    pub fn url(&self) -> &str {
        match self {
            Self::Push(url) | Self::Replace(url) | Self::Back(url) | Self::Forward(url) => url,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Push(_) => "push",
            Self::Replace(_) => "replace",
            Self::Back(_) => "back",
            Self::Forward(_) => "forward",
        }
    }
}
