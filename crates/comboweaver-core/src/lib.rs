pub mod catalog;
pub mod config;
pub mod diagnostics;
pub mod favorites;
pub mod filter;
pub mod fixtures;
pub mod media;
pub mod model;
pub mod persistence;
pub mod playback;
pub mod reorder;
pub mod sequence;
pub mod session;
pub mod share;
pub mod suggest;
pub mod workbench;

pub use catalog::{
    CatalogEntry, CatalogError, CharacterCatalog, load_catalog, load_character, scan_catalog_dir,
};
pub use config::AppConfig;
pub use diagnostics::{TelemetryGuard, init_tracing, trace_file_name};
pub use favorites::{FavoriteCombo, FavoritesError, FavoritesStore};
pub use filter::{PartPredicate, TagCategory, TagFilter, available_tags, filter_parts};
pub use media::{
    ClipToken, EmbedReadiness, HeadlessBackend, MediaBackend, MediaCall, MediaError, MediaEvent,
    MediaHandle, MediaKind, MediaSource, PlayerState,
};
pub use model::{ClipWindow, ComboStats, Part, PartTags, SampleCombo, SequenceEntry};
pub use playback::{PlaybackConfig, PlaybackController, PlaybackPhase, PlaybackStatus, Stall};
pub use reorder::{
    DragSource, DropOutcome, LongPressToken, ReorderController, ReorderError, ReorderState,
    RowBounds, relocate,
};
pub use sequence::SequenceStore;
pub use session::{SessionSnapshot, load_session, save_session};
pub use share::{
    SharePayload, ShareError, decode_share_code, encode_share_code, parse_share_url, share_url,
};
pub use suggest::{
    AcceptedSuggestion, ComboSuggester, SuggestError, SuggestedCombo, SuggestionRequest,
    accept_suggestion, request_suggestion,
};
pub use workbench::{Workbench, WorkbenchError, WorkbenchStatus};
