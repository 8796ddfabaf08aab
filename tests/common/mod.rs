//! In-memory transport and canned SDMX-JSON documents shared by the
//! integration tests.
#![allow(dead_code)]

use imf_dots::{Client, ClientConfig, Error, Transport};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

pub const BASE: &str = "http://mock.test/REST/SDMX_JSON.svc";

/// Answers a request with the first route whose fragment occurs in the URL;
/// anything else is a 404. Every requested URL is recorded.
#[derive(Clone, Default)]
pub struct MockTransport {
    routes: Arc<Mutex<Vec<(String, Value)>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, fragment: &str, body: Value) -> Self {
        self.routes
            .lock()
            .unwrap()
            .push((fragment.to_string(), body));
        self
    }

    /// Swap the body served for an existing fragment.
    pub fn replace(&self, fragment: &str, body: Value) {
        let mut routes = self.routes.lock().unwrap();
        routes.retain(|(f, _)| f != fragment);
        routes.push((fragment.to_string(), body));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, fragment: &str) -> usize {
        self.calls().iter().filter(|u| u.contains(fragment)).count()
    }

    /// A client over this transport; the transport stays usable for
    /// inspecting calls.
    pub fn client(&self) -> Client {
        Client::with_transport(ClientConfig::default().with_base_url(BASE), self.clone())
    }
}

impl Transport for MockTransport {
    fn get_json(&self, url: &str) -> imf_dots::Result<Value> {
        self.calls.lock().unwrap().push(url.to_string());
        let routes = self.routes.lock().unwrap();
        routes
            .iter()
            .find(|(fragment, _)| url.contains(fragment.as_str()))
            .map(|(_, body)| body.clone())
            .ok_or_else(|| Error::remote(format!("HTTP 404 Not Found for {url}")))
    }
}

fn code(value: &str, text: &str) -> Value {
    json!({ "@value": value, "Description": { "@xml:lang": "en", "#text": text } })
}

/// `DataStructure/DOT`: three code lists (countries are the third) plus
/// annotations and dimensions.
pub fn dot_structure() -> Value {
    json!({
        "Structure": {
            "CodeLists": {
                "CodeList": [
                    { "@id": "CL_UNIT_MULT", "Code": [code("0", "Units"), code("6", "Millions")] },
                    { "@id": "CL_FREQ", "Code": [code("A", "Annual"), code("M", "Monthly")] },
                    { "@id": "CL_AREA_DOT", "Code": [
                        code("BE", "Belgium"),
                        code("BO", "Bolivia"),
                        code("BR", "Brazil"),
                        code("BG", "Bulgaria"),
                        code("CN", "China, P.R.: Mainland"),
                        code("GR", "Greece"),
                        code("US", "United States")
                    ]},
                    { "@id": "CL_INDICATOR_DOT", "Code": code("TXG_FOB_USD", "Goods, Value of Exports, Free on board (FOB), US Dollars") }
                ]
            },
            "KeyFamilies": {
                "KeyFamily": {
                    "@id": "DOT",
                    "Annotations": {
                        "Annotation": [
                            { "AnnotationTitle": "Latest Update Date", "AnnotationText": { "#text": "<p>04/28/2021</p>" } },
                            { "AnnotationTitle": "Name", "AnnotationText": { "#text": "Direction of Trade Statistics&nbsp;(DOTS)" } }
                        ]
                    },
                    "Components": {
                        "Dimension": [
                            { "@conceptRef": "FREQ", "@conceptSchemeRef": "DOT", "@codelist": "CL_FREQ" },
                            { "@conceptRef": "REF_AREA", "@conceptSchemeRef": "DOT", "@codelist": "CL_AREA_DOT" },
                            { "@conceptRef": "INDICATOR", "@conceptSchemeRef": "DOT", "@codelist": "CL_INDICATOR_DOT" },
                            { "@conceptRef": "COUNTERPART_AREA", "@conceptSchemeRef": "DOT", "@codelist": "CL_COUNTERPART_AREA_DOT" }
                        ]
                    }
                }
            }
        }
    })
}

/// `Dataflow`: deliberately unsorted, with the `DS-` prefix.
pub fn dataflows() -> Value {
    json!({
        "Structure": {
            "Dataflows": {
                "Dataflow": [
                    { "@id": "DS-IFS", "Name": { "#text": "International Financial Statistics (IFS)" } },
                    { "@id": "DS-DOT", "Name": { "#text": "Direction of Trade Statistics (DOTS)" } },
                    { "@id": "DS-BOP", "Name": { "#text": "Balance of Payments (BOP)" } }
                ]
            }
        }
    })
}

/// `CodeList/{id}` with the given (value, description) codes.
pub fn code_list(id: &str, codes: &[(&str, &str)]) -> Value {
    let codes: Vec<Value> = codes.iter().map(|(v, t)| code(v, t)).collect();
    json!({ "Structure": { "CodeLists": { "CodeList": { "@id": id, "Code": codes } } } })
}

fn obs(periods: &[&str], values: &[f64]) -> Vec<Value> {
    periods
        .iter()
        .zip(values)
        .map(|(p, v)| json!({ "@TIME_PERIOD": p, "@OBS_VALUE": format!("{v}") }))
        .collect()
}

/// `CompactData/DOT/...` for one counterpart. Series are served in
/// exports, imports, balance order to exercise matching on `@INDICATOR`.
pub fn compact(periods: &[&str], exports: &[f64], imports: &[f64]) -> Value {
    let balance: Vec<f64> = exports.iter().zip(imports).map(|(x, m)| x - m).collect();
    json!({
        "CompactData": {
            "DataSet": {
                "Series": [
                    { "@FREQ": "A", "@INDICATOR": "TXG_FOB_USD", "@UNIT_MULT": "6", "Obs": obs(periods, exports) },
                    { "@FREQ": "A", "@INDICATOR": "TMG_CIF_USD", "@UNIT_MULT": "6", "Obs": obs(periods, imports) },
                    { "@FREQ": "A", "@INDICATOR": "TBG_USD", "@UNIT_MULT": "6", "Obs": obs(periods, &balance) }
                ]
            }
        }
    })
}

/// URL fragment that identifies the CompactData request for a counterpart.
pub fn dots_route(counterpart: &str) -> String {
    format!("TMG_CIF_USD.{counterpart}?")
}
