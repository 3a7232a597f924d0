pub type CollagerResult<T> = Result<T, CollagerError>;

#[derive(thiserror::Error, Debug)]
pub enum CollagerError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("layout error: {0}")]
    Layout(String),

    #[error("render error: {0}")]
    Render(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CollagerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn layout(msg: impl Into<String>) -> Self {
        Self::Layout(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            CollagerError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(
            CollagerError::config("x")
                .to_string()
                .contains("config error:")
        );
        assert!(
            CollagerError::layout("x")
                .to_string()
                .contains("layout error:")
        );
        assert!(
            CollagerError::render("x")
                .to_string()
                .contains("render error:")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = CollagerError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
