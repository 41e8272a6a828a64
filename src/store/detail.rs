//! Reducer for the detail-view slice.

use crate::db::Photo;
use crate::work::PhotoWork;

use super::Action;

#[derive(Debug, Clone, Default)]
pub struct DetailState {
    pub current: Option<DetailPhoto>,
}

/// The photo currently opened in the detail view.
#[derive(Debug, Clone)]
pub struct DetailPhoto {
    pub photo: Photo,
    pub work: PhotoWork,
    pub tags: Vec<String>,
}

pub fn reduce(state: &DetailState, action: &Action) -> DetailState {
    match action {
        Action::DetailOpened { photo, work, tags } => DetailState {
            current: Some(DetailPhoto {
                photo: photo.clone(),
                work: work.clone(),
                tags: tags.clone(),
            }),
        },
        Action::DetailClosed => DetailState::default(),
        Action::PhotoWorkChanged { path, work } => match &state.current {
            Some(current) if current.photo.path == *path => DetailState {
                current: Some(DetailPhoto {
                    work: work.clone(),
                    ..current.clone()
                }),
            },
            _ => state.clone(),
        },
        Action::PhotosChanged { photos } => match &state.current {
            Some(current) => match photos.iter().find(|p| p.id == current.photo.id) {
                Some(changed) => DetailState {
                    current: Some(DetailPhoto {
                        photo: changed.clone(),
                        ..current.clone()
                    }),
                },
                None => state.clone(),
            },
            None => state.clone(),
        },
        _ => state.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn open_state(path: &str) -> DetailState {
        DetailState {
            current: Some(DetailPhoto {
                photo: Photo {
                    id: 7,
                    path: path.to_string(),
                    ..Photo::default()
                },
                work: PhotoWork::default(),
                tags: vec!["beach".to_string()],
            }),
        }
    }

    #[test]
    fn work_change_for_open_photo_updates_work_only() {
        let state = open_state("/photos/a.jpg");
        let mut work = PhotoWork::default();
        work.set_edit("crop", json!({"left": 1}));

        let next = reduce(
            &state,
            &Action::PhotoWorkChanged {
                path: "/photos/a.jpg".to_string(),
                work: work.clone(),
            },
        );
        let current = next.current.unwrap();
        assert_eq!(current.work, work);
        assert_eq!(current.tags, vec!["beach"]);
    }

    #[test]
    fn work_change_for_other_photo_is_ignored() {
        let state = open_state("/photos/a.jpg");
        let mut work = PhotoWork::default();
        work.flagged = true;

        let next = reduce(
            &state,
            &Action::PhotoWorkChanged {
                path: "/photos/other.jpg".to_string(),
                work,
            },
        );
        assert!(next.current.unwrap().work.is_empty());
    }

    #[test]
    fn photo_record_change_patches_open_photo() {
        let state = open_state("/photos/a.jpg");
        let mut changed = state.current.as_ref().unwrap().photo.clone();
        changed.flagged = true;

        let next = reduce(
            &state,
            &Action::PhotosChanged {
                photos: vec![changed],
            },
        );
        assert!(next.current.unwrap().photo.flagged);
    }

    #[test]
    fn close_clears_the_slice() {
        let state = open_state("/photos/a.jpg");
        let next = reduce(&state, &Action::DetailClosed);
        assert!(next.current.is_none());
    }
}
