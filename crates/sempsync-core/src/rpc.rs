//! Legacy SEMP-v1 XML transport.
//!
//! Some read-only facts (service ports, router name, internal queues) are
//! only reachable through the broker's first-generation XML protocol: the
//! request body is an `<rpc>...</rpc>` document POSTed to `/SEMP`, and the
//! endpoint answers HTTP 200 regardless of outcome — success is signalled
//! solely by `rpc-reply.execute-result.@code == "ok"`.
//!
//! Responses are converted into a nested [`Value`] tree: child elements
//! become map entries (repeated siblings collapse into arrays), attributes
//! are prefixed `@`, and text content of a mixed element lands under
//! `#text`.

use log::debug;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::{Map, Value};

use crate::client::SempClient;
use crate::error::{SempError, SempResult};

/// Escape a string for embedding in a request document.
pub fn xml_escape(raw: &str) -> String {
    quick_xml::escape::escape(raw).into_owned()
}

/// POST one `<rpc>` document and return the parsed reply tree after checking
/// the execute-result code.
pub async fn post_sempv1(client: &SempClient, xml: &str) -> SempResult<Value> {
    let url = format!("{}/SEMP", client.config.base_url());
    debug!("POST {}", url);

    let resp = client
        .http
        .post(&url)
        .basic_auth(&client.config.username, Some(&client.config.password))
        .header("x-broker-name", &client.config.broker_name)
        .header("Content-Type", "application/xml")
        .body(xml.to_string())
        .send()
        .await
        .map_err(|e| SempError::connection(format!("{e}")))?;

    let status = resp.status().as_u16();
    let text = resp
        .text()
        .await
        .map_err(|e| SempError::connection(format!("failed to read response body: {e}")))?;

    if status != 200 {
        return Err(SempError::rpc(format!(
            "legacy management call answered HTTP {status}"
        )));
    }

    let body = xml_to_value(&text)?;
    let code = value_at_path(&body, &["rpc-reply", "execute-result", "@code"])
        .and_then(Value::as_str);
    if code == Some("ok") {
        Ok(body)
    } else {
        Err(SempError::rpc("legacy management call reported failure").with_details(body))
    }
}

/// Run a list-shaped legacy request and pull the element list out of the
/// reply at `list_path`. A single matching element arrives as one object and
/// is normalised to a one-element list.
pub async fn execute_sempv1_list(
    client: &SempClient,
    xml: &str,
    list_path: &[&str],
) -> SempResult<Vec<Value>> {
    let body = post_sempv1(client, xml).await?;
    Ok(match value_at_path(&body, list_path) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.clone(),
        Some(single) => vec![single.clone()],
    })
}

/// Walk a nested map by key path.
pub fn value_at_path<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = value;
    for key in path {
        current = current.get(key)?;
    }
    Some(current)
}

// ─── XML → Value conversion ─────────────────────────────────────────

struct Elem {
    name: String,
    map: Map<String, Value>,
    text: String,
}

fn push_child(map: &mut Map<String, Value>, name: &str, value: Value) {
    match map.get_mut(name) {
        None => {
            map.insert(name.to_string(), value);
        }
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
    }
}

fn finish(elem: Elem) -> (String, Value) {
    let value = if elem.map.is_empty() {
        if elem.text.is_empty() {
            Value::Null
        } else {
            Value::String(elem.text)
        }
    } else if elem.text.is_empty() {
        Value::Object(elem.map)
    } else {
        let mut map = elem.map;
        map.insert("#text".into(), Value::String(elem.text));
        Value::Object(map)
    };
    (elem.name, value)
}

/// Convert an XML document into the nested-map shape described in the module
/// docs.
pub fn xml_to_value(xml: &str) -> SempResult<Value> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut root: Map<String, Value> = Map::new();
    let mut stack: Vec<Elem> = Vec::new();

    let open = |e: &quick_xml::events::BytesStart<'_>| -> SempResult<Elem> {
        let name = String::from_utf8(e.name().as_ref().to_vec())
            .map_err(|_| SempError::parse("invalid UTF-8 in element name"))?;
        let mut map = Map::new();
        for attr in e.attributes() {
            let attr = attr.map_err(|e| SempError::parse(format!("bad attribute: {e}")))?;
            let key = String::from_utf8(attr.key.as_ref().to_vec())
                .map_err(|_| SempError::parse("invalid UTF-8 in attribute name"))?;
            let val = attr
                .unescape_value()
                .map_err(|e| SempError::parse(format!("bad attribute value: {e}")))?;
            map.insert(format!("@{key}"), Value::String(val.into_owned()));
        }
        Ok(Elem {
            name,
            map,
            text: String::new(),
        })
    };

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => stack.push(open(e)?),
            Ok(Event::Empty(ref e)) => {
                let (name, value) = finish(open(e)?);
                match stack.last_mut() {
                    Some(parent) => push_child(&mut parent.map, &name, value),
                    None => push_child(&mut root, &name, value),
                }
            }
            Ok(Event::End(_)) => {
                if let Some(elem) = stack.pop() {
                    let (name, value) = finish(elem);
                    match stack.last_mut() {
                        Some(parent) => push_child(&mut parent.map, &name, value),
                        None => push_child(&mut root, &name, value),
                    }
                }
            }
            Ok(Event::Text(ref t)) => {
                if let Some(elem) = stack.last_mut() {
                    let text = t
                        .unescape()
                        .map_err(|e| SempError::parse(format!("bad text node: {e}")))?;
                    elem.text.push_str(&text);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(SempError::parse(format!(
                    "XML error at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
    }

    Ok(Value::Object(root))
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_element_becomes_string() {
        let v = xml_to_value("<rpc><show><router-name>v1</router-name></show></rpc>").unwrap();
        assert_eq!(v["rpc"]["show"]["router-name"], json!("v1"));
    }

    #[test]
    fn attributes_are_prefixed() {
        let v = xml_to_value(r#"<rpc-reply semp-version="soltr/9_5"><execute-result code="ok"/></rpc-reply>"#)
            .unwrap();
        assert_eq!(v["rpc-reply"]["@semp-version"], json!("soltr/9_5"));
        assert_eq!(v["rpc-reply"]["execute-result"]["@code"], json!("ok"));
    }

    #[test]
    fn repeated_siblings_collapse_to_array() {
        let v = xml_to_value("<queues><queue><name>a</name></queue><queue><name>b</name></queue></queues>")
            .unwrap();
        let queues = v["queues"]["queue"].as_array().unwrap();
        assert_eq!(queues.len(), 2);
        assert_eq!(queues[1]["name"], json!("b"));
    }

    #[test]
    fn empty_element_is_null() {
        let v = xml_to_value("<rpc><show><service/></show></rpc>").unwrap();
        assert_eq!(v["rpc"]["show"]["service"], Value::Null);
    }

    #[test]
    fn escaped_text_round_trips() {
        let v = xml_to_value("<name>a &amp; b</name>").unwrap();
        assert_eq!(v["name"], json!("a & b"));
    }

    #[test]
    fn value_at_path_walks_nested_maps() {
        let v = json!({"rpc-reply": {"rpc": {"show": {"service": {"services": {"service": []}}}}}});
        assert!(value_at_path(&v, &["rpc-reply", "rpc", "show", "service", "services"]).is_some());
        assert!(value_at_path(&v, &["rpc-reply", "nope"]).is_none());
    }

    #[test]
    fn escape_helper() {
        assert_eq!(xml_escape("a<b"), "a&lt;b");
        assert_eq!(xml_escape("plain"), "plain");
    }

    #[test]
    fn reply_code_lookup() {
        let v = xml_to_value(
            r#"<rpc-reply><execute-result code="fail"/><rpc><show/></rpc></rpc-reply>"#,
        )
        .unwrap();
        let code = value_at_path(&v, &["rpc-reply", "execute-result", "@code"])
            .and_then(Value::as_str);
        assert_eq!(code, Some("fail"));
    }
}
