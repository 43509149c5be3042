//! Live preview of an image chosen in a file input.

use std::path::Path;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::dom::Dom;
use crate::error::WidgetError;

/// A file picked by the user.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Read a file from disk.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, WidgetError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self { name, bytes })
    }

    /// MIME type guessed from the file name.
    pub fn mime(&self) -> String {
        mime_guess::from_path(&self.name)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Optional limits on what may be previewed. The default accepts anything.
#[derive(Debug, Clone, Default)]
pub struct PreviewPolicy {
    pub max_bytes: Option<u64>,
    /// Accepted MIME prefixes such as `image/`. Empty accepts all.
    pub allowed_mime_prefixes: Vec<String>,
}

impl PreviewPolicy {
    /// Images only, up to `max_bytes`.
    pub fn images_up_to(max_bytes: u64) -> Self {
        Self {
            max_bytes: Some(max_bytes),
            allowed_mime_prefixes: vec!["image/".to_string()],
        }
    }

    pub fn check(&self, file: &SelectedFile) -> Result<(), WidgetError> {
        if let Some(limit) = self.max_bytes {
            if file.size() > limit {
                return Err(WidgetError::FileTooLarge {
                    size: file.size(),
                    limit,
                });
            }
        }
        let mime = file.mime();
        if !self.allowed_mime_prefixes.is_empty()
            && !self
                .allowed_mime_prefixes
                .iter()
                .any(|prefix| mime.starts_with(prefix.as_str()))
        {
            return Err(WidgetError::UnsupportedType(mime));
        }
        Ok(())
    }
}

/// `data:{mime};base64,{payload}` for the file.
pub fn data_url(file: &SelectedFile) -> String {
    format!("data:{};base64,{}", file.mime(), STANDARD.encode(&file.bytes))
}

/// What a file selection did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewOutcome {
    /// The input was cleared.
    NoFile,
    /// The preview element is not on the page.
    MissingElement,
    /// The preview now shows the file.
    Shown { mime: String },
}

/// Binds a file input to a preview `<img>`.
pub struct ImagePreview {
    dom: Arc<dyn Dom>,
    policy: PreviewPolicy,
}

impl ImagePreview {
    pub fn new(dom: Arc<dyn Dom>) -> Self {
        Self::with_policy(dom, PreviewPolicy::default())
    }

    pub fn with_policy(dom: Arc<dyn Dom>, policy: PreviewPolicy) -> Self {
        Self { dom, policy }
    }

    /// Handle a change of the file input.
    ///
    /// Encodes off the async executor, then sets the preview's `src` and
    /// removes its `hidden` class.
    pub async fn on_file_selected(
        &self,
        preview_id: &str,
        file: Option<SelectedFile>,
    ) -> Result<PreviewOutcome, WidgetError> {
        let Some(file) = file else {
            return Ok(PreviewOutcome::NoFile);
        };
        self.policy.check(&file)?;

        let mime = file.mime();
        let size = file.size();
        let url = tokio::task::spawn_blocking(move || data_url(&file))
            .await
            .map_err(std::io::Error::other)?;

        if !self.dom.set_attribute(preview_id, "src", &url) {
            tracing::debug!(preview_id, "Preview element not found");
            return Ok(PreviewOutcome::MissingElement);
        }
        self.dom.remove_class(preview_id, "hidden");
        tracing::debug!(preview_id, %mime, size, "Image preview updated");

        Ok(PreviewOutcome::Shown { mime })
    }
}
