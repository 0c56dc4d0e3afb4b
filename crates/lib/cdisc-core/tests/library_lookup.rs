//! End-to-end lookup scenarios against an in-memory library source.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::{Value, json};

use cdisc_core::library::ct::CodelistLookup;
use cdisc_core::{
    CdiscLibrary, CtStandard, HeaderOverrides, IgProduct, LibraryError, LibrarySource, MatchMode,
    SourceError,
};

struct FakeSource {
    docs: HashMap<String, Value>,
}

impl FakeSource {
    fn new() -> Self {
        Self {
            docs: HashMap::new(),
        }
    }

    fn with(mut self, path: &str, doc: Value) -> Self {
        self.docs.insert(path.to_string(), doc);
        self
    }
}

#[async_trait]
impl LibrarySource for FakeSource {
    async fn get_json(
        &self,
        path: &str,
        _headers: Option<&HeaderOverrides>,
    ) -> Result<Value, SourceError> {
        self.docs.get(path).cloned().ok_or(SourceError::Http {
            url: path.to_string(),
            status: 404,
        })
    }
}

fn fixture(name: &str) -> Value {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name);
    let json = std::fs::read_to_string(&path).unwrap_or_else(|err| {
        let path_display = path.display();
        panic!("failed to read fixture at {path_display}: {err}")
    });
    serde_json::from_str(&json)
        .unwrap_or_else(|err| panic!("failed to parse fixture {name}: {err}"))
}

fn ct_packages_listing() -> Value {
    fixture("ct_packages.json")
}

fn sdtm_package() -> Value {
    fixture("sdtmct_package.json")
}

#[tokio::test]
async fn latest_ct_version_picks_the_newest_date() {
    let source = FakeSource::new().with("/mdr/ct/packages", ct_packages_listing());
    let library = CdiscLibrary::new(source);

    let versions = library
        .latest_ct_version(CtStandard::Sdtm, None)
        .await
        .expect("version resolution should succeed");
    assert_eq!(versions.latest, "2025-03-25");
    assert_eq!(versions.all, ["2024-12-20", "2025-03-25"]);
}

#[tokio::test]
async fn version_resolution_without_candidates_reports_samples() {
    let source = FakeSource::new().with("/mdr/ct/packages", ct_packages_listing());
    let library = CdiscLibrary::new(source);

    let err = library
        .latest_ct_version(CtStandard::Glossary, None)
        .await
        .expect_err("no glossary packages are listed");
    match err {
        LibraryError::NoVersionsFound { subject, samples } => {
            assert!(subject.contains("GLOSSARY"));
            assert!(!samples.is_empty());
        }
        other => panic!("expected NoVersionsFound, got {other}"),
    }
}

#[tokio::test]
async fn codelist_miss_is_a_lookup_outcome_not_an_error() {
    let source = FakeSource::new()
        .with("/mdr/ct/packages", ct_packages_listing())
        .with("/mdr/ct/packages/sdtmct-2025-03-25", sdtm_package());
    let library = CdiscLibrary::new(source);

    let found = library
        .find_codelist("AGEU", MatchMode::Id, CtStandard::Sdtm, None, None)
        .await
        .expect("lookup should succeed");
    match found {
        CodelistLookup::Found(detail) => {
            assert_eq!(detail.codelist_info.codelist_code, "C66781");
            assert_eq!(detail.codelist_info.version, "2025-03-25");
            assert_eq!(detail.term_count, 1);
        }
        CodelistLookup::Missing { .. } => panic!("AGEU exists in the package"),
    }

    let missing = library
        .find_codelist("NOPE", MatchMode::Id, CtStandard::Sdtm, None, None)
        .await
        .expect("a miss is not an error");
    assert!(matches!(missing, CodelistLookup::Missing { .. }));
}

#[tokio::test]
async fn sdtm_variable_lookup_scans_common_domains_to_cm() {
    let cm_dataset = fixture("sdtm_cm_dataset.json");
    let empty_dataset = |name: &str| {
        json!({
            "label": name,
            "datasetVariables": [{"name": "STUDYID"}, {"name": "USUBJID"}]
        })
    };

    let mut source = FakeSource::new().with("/mdr/sdtmig/3-4/datasets/CM", cm_dataset);
    for domain in ["DM", "AE", "VS", "LB", "EX"] {
        source = source.with(
            &format!("/mdr/sdtmig/3-4/datasets/{domain}"),
            empty_dataset(domain),
        );
    }
    let library = CdiscLibrary::new(source);

    let detail = library
        .dataset_variable_details(IgProduct::Sdtmig, "cmtrt", None, Some("3.4"), false, None)
        .await
        .expect("CMTRT lives in CM");
    assert_eq!(detail.variable.as_deref(), Some("CMTRT"));
    assert_eq!(detail.domain, "CM");
    assert_eq!(detail.version, "3-4");
    assert_eq!(detail.ordinal, Some(7));
}

#[tokio::test]
async fn exhausted_domain_scan_is_a_not_found_error() {
    let library = CdiscLibrary::new(FakeSource::new());

    let err = library
        .dataset_variable_details(IgProduct::Sdtmig, "XXNOPE", None, Some("3-4"), false, None)
        .await
        .expect_err("nothing contains XXNOPE");
    assert!(matches!(err, LibraryError::VariableNotFound { .. }));
}

#[tokio::test]
async fn ig_version_resolution_orders_ordinals_numerically() {
    let source = FakeSource::new().with(
        "/mdr/sdtmig",
        json!({
            "_links": {
                "sdtmigVersions": [
                    {"href": "/mdr/sdtmig/3-2"},
                    {"href": "/mdr/sdtmig/3-10"},
                    {"href": "/mdr/sdtmig/3-3"}
                ]
            }
        }),
    );
    let library = CdiscLibrary::new(source);

    let versions = library
        .latest_ig_version(IgProduct::Sdtmig, None)
        .await
        .expect("version list is non-empty");
    assert_eq!(versions.latest, "3-10");
    assert_eq!(versions.all, ["3-2", "3-3", "3-10"]);
}

#[tokio::test]
async fn adam_variable_is_found_inside_a_variable_set() {
    let listing = json!({
        "_links": {
            "dataStructures": [
                {"href": "/mdr/adam/adamig-1-3/datastructures/ADSL"},
                {"href": "/mdr/adam/adamig-1-3/datastructures/BDS"}
            ]
        }
    });
    let adsl = json!({
        "label": "Subject-Level Analysis Dataset",
        "analysisVariables": [{"name": "USUBJID"}]
    });
    let bds = json!({
        "label": "Basic Data Structure",
        "analysisVariableSets": [
            {"analysisVariables": [
                {"name": "AVAL", "label": "Analysis Value", "simpleDatatype": "Num", "core": "Cond"}
            ]}
        ]
    });
    let source = FakeSource::new()
        .with("/mdr/adam/adamig-1-3/datastructures", listing)
        .with("/mdr/adam/adamig-1-3/datastructures/ADSL", adsl)
        .with("/mdr/adam/adamig-1-3/datastructures/BDS", bds);
    let library = CdiscLibrary::new(source);

    let detail = library
        .adam_variable_details("aval", None, None)
        .await
        .expect("AVAL lives in BDS");
    assert_eq!(detail.dataset, "BDS");
    assert_eq!(detail.variable.as_deref(), Some("AVAL"));
    assert_eq!(detail.version, "1-3");
    assert!(detail.codelists.is_empty());
}

#[tokio::test]
async fn dataset_structure_enriches_codelists_and_absorbs_ct_failures() {
    let dataset = json!({
        "label": "Demographics",
        "datasetClass": {"name": "Special Purpose"},
        "datasetVariables": [
            {
                "name": "AGEU", "label": "Age Units", "simpleDatatype": "Char", "ordinal": "2",
                "_links": {"codelist": {"href": "/mdr/root/ct/sdtmct/codelists/C66781"}}
            },
            {"name": "USUBJID", "label": "Unique Subject Identifier", "ordinal": "1"}
        ]
    });
    // No CT package listing is registered, so enrichment cannot resolve a
    // version; the structure must still come back whole.
    let source = FakeSource::new().with("/mdr/sdtmig/3-4/datasets/DM", dataset);
    let library = CdiscLibrary::new(source);

    let structure = library
        .dataset_structure(IgProduct::Sdtmig, "dm", Some("3-4"), true, None)
        .await
        .expect("dataset fetch succeeds even when enrichment cannot");
    assert_eq!(structure.domain, "DM");
    assert_eq!(structure.class.as_deref(), Some("Special Purpose"));
    let names: Vec<_> = structure
        .variables
        .iter()
        .filter_map(|variable| variable.name.as_deref())
        .collect();
    assert_eq!(names, ["USUBJID", "AGEU"]);
    assert!(structure.variables.iter().all(|variable| variable.codelist.is_none()));
}

#[tokio::test]
async fn cdash_field_details_resolve_domain_and_codelist() {
    let cm_domain = json!({
        "label": "Concomitant Medications",
        "fields": [
            {
                "name": "CMTRT", "label": "Reported Name of Treatment", "ordinal": "4",
                "prompt": "Medication", "questionText": "What was the medication taken?",
                "simpleDatatype": "Char", "core": "HR",
                "_links": {"codelist": [{"href": "/mdr/ct/packages/sdtmct-2025-03-25/codelists/C66781"}]}
            }
        ]
    });
    let empty_domain = json!({"fields": [{"name": "STUDYID"}]});

    let mut source = FakeSource::new()
        .with("/mdr/cdashig/2-3/domains/CM", cm_domain)
        .with("/mdr/ct/packages", ct_packages_listing())
        .with("/mdr/ct/packages/sdtmct-2025-03-25", sdtm_package());
    for domain in ["DM", "AE", "VS", "LB", "EX"] {
        source = source.with(&format!("/mdr/cdashig/2-3/domains/{domain}"), empty_domain.clone());
    }
    let library = CdiscLibrary::new(source);

    let detail = library
        .cdash_field_details("CMTRT", None, Some("2.3"), None)
        .await
        .expect("CMTRT lives in CM");
    assert_eq!(detail.field.as_deref(), Some("CMTRT"));
    assert_eq!(detail.domain, "CM");
    assert_eq!(detail.version, "2-3");
    let codelist = detail.codelist.expect("codelist link should resolve");
    assert_eq!(codelist.codelist_info.id, "AGEU");
}

#[tokio::test]
async fn explicit_domain_skips_the_candidate_scan() {
    // Only the QS dataset exists; a scan would die on DM first.
    let qs = json!({
        "datasetVariables": [
            {"name": "QSTESTCD", "label": "Question Short Name", "ordinal": "8"}
        ]
    });
    let source = FakeSource::new().with("/mdr/sdtmig/3-4/datasets/QS", qs);
    let library = CdiscLibrary::new(source);

    let detail = library
        .dataset_variable_details(IgProduct::Sdtmig, "QSTESTCD", Some("qs"), Some("3-4"), false, None)
        .await
        .expect("explicit domain is trusted");
    assert_eq!(detail.domain, "QS");
    assert_eq!(detail.variable.as_deref(), Some("QSTESTCD"));
}
