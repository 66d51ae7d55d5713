//! Host hooks for the shared surfaces

use crate::models::GameId;

/// Platform abstraction for the sidebar and grid
///
/// The host owns selection state and decides where card artwork comes from.
pub trait SurfacePlatform {
    /// Currently selected game, if any
    fn selected(&self) -> Option<&GameId>;

    /// Called when a record is clicked on either surface
    fn select(&mut self, id: GameId);

    /// Artwork for a grid card; `None` draws a text-only card
    fn image_source(&self, _id: &GameId) -> Option<egui::ImageSource<'static>> {
        None
    }
}
