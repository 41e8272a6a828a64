//! Reducer for the library slice: photo sections, the tag/device/date shelves
//! and the active filter.

use crate::db::{DateCount, LibraryFilter, Photo, PhotoSection, Tag};

use super::Action;

#[derive(Debug, Clone, Default)]
pub struct LibraryState {
    pub filter: LibraryFilter,
    pub sections: Vec<PhotoSection>,
    pub tags: Vec<Tag>,
    pub devices: Vec<String>,
    pub dates: Vec<DateCount>,
}

pub fn reduce(state: &LibraryState, action: &Action) -> LibraryState {
    match action {
        Action::SectionsLoaded { filter, sections } => LibraryState {
            filter: filter.clone(),
            sections: sections.clone(),
            ..state.clone()
        },
        Action::FilterChanged { filter } => LibraryState {
            filter: filter.clone(),
            ..state.clone()
        },
        Action::TagsLoaded { tags } => LibraryState {
            tags: tags.clone(),
            ..state.clone()
        },
        Action::DevicesLoaded { devices } => LibraryState {
            devices: devices.clone(),
            ..state.clone()
        },
        Action::DatesLoaded { dates } => LibraryState {
            dates: dates.clone(),
            ..state.clone()
        },
        Action::PhotosChanged { photos } => apply_photo_changes(state, photos),
        _ => state.clone(),
    }
}

/// Patch changed records into the loaded sections, then drop records that no
/// longer belong in the current view (trashed photos in a normal view,
/// unflagged photos in the flagged view, restored photos in the trash view).
/// Sections left empty disappear.
fn apply_photo_changes(state: &LibraryState, photos: &[Photo]) -> LibraryState {
    let filter = state.filter.clone();
    let mut sections = state.sections.clone();

    for section in &mut sections {
        for slot in &mut section.photos {
            if let Some(changed) = photos.iter().find(|p| p.id == slot.id) {
                *slot = changed.clone();
            }
        }
        section.photos.retain(|photo| filter.matches(photo));
    }
    sections.retain(|section| !section.photos.is_empty());

    LibraryState {
        sections,
        ..state.clone()
    }
}
