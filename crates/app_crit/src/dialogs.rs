//! User dialogs

/// Blocking dialogs shown by the host
#[trait_variant::make(Send)]
pub trait Dialogs: Send + Sync {
    async fn alert(&self, message: &str);

    /// `true` when the user accepts
    async fn confirm(&self, message: &str) -> bool;
}
