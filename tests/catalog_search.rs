mod common;

use common::{MockTransport, code_list, dataflows, dot_structure};
use serde_json::json;

fn catalog() -> MockTransport {
    MockTransport::new()
        .route("DataStructure/DOT", dot_structure())
        .route("/Dataflow", dataflows())
        .route(
            "CodeList/CL_INDICATOR_FSI",
            code_list(
                "CL_INDICATOR_FSI",
                &[
                    ("FSANL_PT", "Non-performing Loans Net of Provisions to Capital, Percent"),
                    ("FSKRC_PT", "Regulatory Capital to Risk-Weighted Assets, Percent"),
                ],
            ),
        )
}

#[test]
fn country_codes_come_from_third_code_list() {
    let mock = catalog();
    let client = mock.client();
    let codes = client.country_codes().unwrap();
    assert_eq!(codes.len(), 7);
    assert_eq!(codes[0].code, "BE");
    assert_eq!(codes[0].name, "Belgium");
    assert!(mock.calls()[0].starts_with(common::BASE));
}

#[test]
fn keyword_search_is_case_insensitive_substring() {
    let client = catalog().client();
    let hits = client.country_search("GREECE", false).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].code, "GR");

    let hits = client.country_search("b", false).unwrap();
    let codes: Vec<&str> = hits.iter().map(|c| c.code.as_str()).collect();
    assert_eq!(codes, ["BE", "BO", "BR", "BG"]);
}

#[test]
fn regex_search_anchors_on_name() {
    let client = catalog().client();
    let hits = client.country_search("^B.*a$", true).unwrap();
    let names: Vec<&str> = hits.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Bolivia", "Bulgaria"]);
}

#[test]
fn bad_pattern_is_invalid_input() {
    let client = catalog().client();
    let err = client.country_search("(", true).unwrap_err();
    assert!(err.is_invalid_input());
}

#[test]
fn no_match_is_empty_not_error() {
    let client = catalog().client();
    assert!(client.country_search("atlantis", false).unwrap().is_empty());
}

#[test]
fn code_lists_are_fetched_once_until_refreshed() {
    let mock = catalog();
    let client = mock.client();
    client.country_codes().unwrap();
    client.country_search("bra", false).unwrap();
    client.country_codes().unwrap();
    assert_eq!(mock.count("DataStructure/DOT"), 1);

    mock.replace(
        "DataStructure/DOT",
        json!({ "Structure": { "CodeLists": { "CodeList": [
            { "Code": [] },
            { "Code": [] },
            { "Code": { "@value": "FR", "Description": { "#text": "France" } } }
        ] } } }),
    );
    let fresh = client.refresh_country_codes().unwrap();
    assert_eq!(fresh.len(), 1);
    assert_eq!(fresh[0].name, "France");
    assert_eq!(client.country_codes().unwrap(), fresh);
    assert_eq!(mock.count("DataStructure/DOT"), 2);
}

#[test]
fn database_ids_lose_prefix_and_are_sorted() {
    let client = catalog().client();
    let dbs = client.database_codes().unwrap();
    let ids: Vec<&str> = dbs.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, ["BOP", "DOT", "IFS"]);

    let hits = client.database_search("trade", false).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "DOT");
}

#[test]
fn database_info_strips_markup() {
    let client = catalog().client();
    let info = client.database_info("DOT").unwrap();
    assert_eq!(info.len(), 2);
    assert_eq!(info[0].variable, "Latest Update Date");
    assert_eq!(info[0].value, "04/28/2021");
    assert_eq!(info[1].value, "Direction of Trade Statistics(DOTS)");
}

#[test]
fn database_dimensions_list_code_lists() {
    let client = catalog().client();
    let dims = client.database_dimensions("DOT").unwrap();
    assert_eq!(dims.len(), 4);
    assert!(dims.iter().all(|d| d.database_id == "DOT"));
    assert_eq!(dims[2].concept, "INDICATOR");
    assert_eq!(dims[2].indicator_id, "CL_INDICATOR_DOT");
}

#[test]
fn unknown_database_is_rejected_before_metadata_request() {
    let mock = catalog();
    let client = mock.client();
    let err = client.database_info("NOPE").unwrap_err();
    assert!(err.is_invalid_input());
    let err = client.database_dimensions("NOPE").unwrap_err();
    assert!(err.is_invalid_input());
    assert_eq!(mock.count("DataStructure/"), 0);
    assert_eq!(mock.count("/Dataflow"), 1);
}

#[test]
fn indicator_dimensions_lists_series() {
    let client = catalog().client();
    let series = client.indicator_dimensions("CL_INDICATOR_FSI").unwrap();
    assert_eq!(series.len(), 2);
    assert_eq!(series[0].indicator_id, "CL_INDICATOR_FSI");
    assert_eq!(series[0].series_id, "FSANL_PT");
}

#[test]
fn indicator_dimensions_surfaces_remote_failures() {
    let mock = catalog().route("CodeList/CL_EMPTY", json!({ "Structure": {} }));
    let client = mock.client();
    assert!(client.indicator_dimensions("CL_EMPTY").unwrap_err().is_remote());
    assert!(client.indicator_dimensions("CL_MISSING").unwrap_err().is_remote());
}

#[test]
fn remote_failure_is_not_cached() {
    let mock = MockTransport::new();
    let client = mock.client();
    assert!(client.country_codes().unwrap_err().is_remote());
    mock.replace("DataStructure/DOT", dot_structure());
    assert_eq!(client.country_codes().unwrap().len(), 7);
}

#[test]
fn indicator_id_is_trimmed_once_for_url_and_rows() {
    let mock = catalog();
    let client = mock.client();
    let series = client.indicator_dimensions("  CL_INDICATOR_FSI ").unwrap();
    assert!(series.iter().all(|s| s.indicator_id == "CL_INDICATOR_FSI"));
    assert!(mock.calls()[0].ends_with("/CodeList/CL_INDICATOR_FSI"));
}

#[test]
fn country_list_is_found_by_id_wherever_it_sits() {
    let mock = MockTransport::new().route(
        "DataStructure/DOT",
        json!({ "Structure": { "CodeLists": { "CodeList": [
            { "@id": "CL_AREA_DOT", "Code": [
                { "@value": "GR", "Description": { "#text": "Greece" } },
                { "@value": "US", "Description": { "#text": "United States" } }
            ] },
            { "@id": "CL_FREQ", "Code": [] },
            { "@id": "CL_INDICATOR_DOT", "Code": { "@value": "TBG_USD", "Description": { "#text": "Trade balance" } } }
        ] } } }),
    );
    let codes = mock.client().country_codes().unwrap();
    let ids: Vec<&str> = codes.iter().map(|c| c.code.as_str()).collect();
    assert_eq!(ids, ["GR", "US"]);
}

#[test]
fn database_regex_search_and_single_fetch() {
    let mock = catalog();
    let client = mock.client();
    let hits = client.database_search(r"\((BOP|IFS)\)$", true).unwrap();
    let ids: Vec<&str> = hits.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, ["BOP", "IFS"]);

    // regex search is case-sensitive
    assert!(client.database_search("^direction", true).unwrap().is_empty());
    assert_eq!(client.database_search("direction", false).unwrap().len(), 1);
    assert_eq!(mock.count("/Dataflow"), 1);

    client.refresh_database_codes().unwrap();
    client.database_search("trade", false).unwrap();
    assert_eq!(mock.count("/Dataflow"), 2);
}
