use std::sync::Arc;

use comboweaver_core::{
    CharacterCatalog, ComboSuggester, EmbedReadiness, HeadlessBackend, Part, SuggestError, SuggestedCombo,
    SuggestionRequest, Workbench, accept_suggestion, fixtures::demo_catalog, request_suggestion,
};

struct CannedSuggester(Vec<&'static str>);

impl ComboSuggester for CannedSuggester {
    fn suggest(
        &self,
        _request: &SuggestionRequest,
        parts: &[Arc<Part>],
    ) -> Result<SuggestedCombo, SuggestError> {
        if parts.is_empty() {
            return Err(SuggestError::Unavailable("no parts offered".to_string()));
        }
        Ok(SuggestedCombo {
            part_ids: self.0.iter().map(ToString::to_string).collect(),
            explanation: "corner carry into level 3".to_string(),
        })
    }
}

fn request() -> SuggestionRequest {
    SuggestionRequest {
        character: "ryu".to_string(),
        purpose: "damage".to_string(),
        position: "corner".to_string(),
        starter: "light".to_string(),
        drive_gauge_limit: 3,
        sa_gauge: "3".to_string(),
    }
}

#[test]
fn accepted_suggestion_loads_into_workbench() {
    let catalog = demo_catalog();
    let suggester = CannedSuggester(vec!["ryu-001", "ryu-777", "ryu-005"]);

    let accepted =
        request_suggestion(&suggester, &catalog, &request()).expect("suggestion should be usable");
    assert_eq!(accepted.dropped_ids, vec!["ryu-777".to_string()]);

    let mut workbench = Workbench::new(catalog, HeadlessBackend::new(), EmbedReadiness::ready());
    assert_eq!(workbench.load_suggestion(accepted), 2);
    assert_eq!(workbench.sequence().part_ids(), vec!["ryu-001", "ryu-005"]);
}

#[test]
fn suggestion_without_known_parts_is_rejected() {
    let catalog = demo_catalog();
    let suggestion = SuggestedCombo {
        part_ids: vec!["ken-001".to_string()],
        explanation: String::new(),
    };

    assert!(matches!(
        accept_suggestion(&catalog, suggestion),
        Err(SuggestError::NoKnownParts(_))
    ));
}

#[test]
fn empty_catalog_surfaces_the_suggester_error() {
    let catalog = CharacterCatalog::empty("ken");
    let suggester = CannedSuggester(vec!["ken-001"]);

    let error = request_suggestion(&suggester, &catalog, &request())
        .expect_err("an empty catalog offers nothing to suggest from");
    assert!(matches!(error, SuggestError::Unavailable(_)));
    assert_eq!(catalog.character(), "ken");
}
