//! Read-only broker facts.
//!
//! Most facts come from the SEMP-v2 `about` tree. Service details on a
//! self-hosted broker (ports per protocol, virtual router name) and the
//! broker-internal MQTT queues are only reachable through the
//! first-generation XML protocol.

use log::debug;
use serde_json::{json, Map, Value};

use sempsync_core::rpc::{execute_sempv1_list, post_sempv1, value_at_path, xml_escape};
use sempsync_core::{SempClient, SempError, SempResult};

use crate::SEMP_V2_CONFIG;

/// Gathered facts: the `about` tree plus service information.
pub async fn gather_broker_facts(client: &SempClient) -> SempResult<Value> {
    debug!("gathering facts from {}", client.config().base_url());
    let mut facts = about_info(client).await?;
    let service = service_info(client).await?;
    facts.insert("service".into(), service);
    Ok(Value::Object(facts))
}

/// The SEMP-v2 `about` tree: `about`, `about/user`, `about/user/msgVpns`,
/// `about/api`, assembled under the same key paths.
pub async fn about_info(client: &SempClient) -> SempResult<Map<String, Value>> {
    let mut about = Map::new();

    let base = client.get(&[SEMP_V2_CONFIG, "about"]).await?;
    let user = client.get(&[SEMP_V2_CONFIG, "about", "user"]).await?;
    let user_vpns = client
        .get(&[SEMP_V2_CONFIG, "about", "user", "msgVpns"])
        .await?;
    let api = client.get(&[SEMP_V2_CONFIG, "about", "api"]).await?;

    let mut user_obj = user.as_object().cloned().unwrap_or_default();
    user_obj.insert("msgVpns".into(), user_vpns);

    about.insert("about".into(), base);
    about.insert("user".into(), Value::Object(user_obj));
    about.insert("api".into(), api);
    Ok(about)
}

/// Service details via the legacy protocol: `show service` merged with the
/// virtual router name from `show router-name`.
pub async fn service_info(client: &SempClient) -> SempResult<Value> {
    let reply = post_sempv1(client, "<rpc><show><service></service></show></rpc>").await?;
    let mut services = value_at_path(&reply, &["rpc-reply", "rpc", "show", "service", "services"])
        .cloned()
        .ok_or_else(|| SempError::parse("show service reply has no services element"))?;

    let reply = post_sempv1(client, "<rpc><show><router-name></router-name></show></rpc>").await?;
    let router_name = value_at_path(
        &reply,
        &["rpc-reply", "rpc", "show", "router-name", "router-name"],
    )
    .cloned()
    .ok_or_else(|| SempError::parse("show router-name reply has no router-name element"))?;

    if let Some(obj) = services.as_object_mut() {
        obj.insert("virtualRouterName".into(), router_name);
    }
    Ok(services)
}

/// The broker's API version record (`about/api`): sempVersion, platform.
pub async fn get_api_about(client: &SempClient) -> SempResult<Value> {
    client.get(&[SEMP_V2_CONFIG, "about", "api"]).await
}

/// List the broker-internal MQTT queues (`#mqtt/...`) matching a name
/// pattern. Only the legacy protocol exposes them.
pub async fn list_magic_queues(
    client: &SempClient,
    msg_vpn: &str,
    where_name: &str,
) -> SempResult<Vec<Value>> {
    let request = format!(
        "<rpc><show><queue><name>{}</name><vpn-name>{}</vpn-name></queue></show></rpc>",
        xml_escape(where_name),
        xml_escape(msg_vpn)
    );
    let queues = execute_sempv1_list(
        client,
        &request,
        &["rpc-reply", "rpc", "show", "queue", "queues", "queue"],
    )
    .await?;

    // keep the stable subset: name + the info block
    Ok(queues
        .into_iter()
        .map(|q| {
            json!({
                "name": q.get("name").cloned().unwrap_or(Value::Null),
                "info": q.get("info").cloned().unwrap_or(Value::Null),
            })
        })
        .collect())
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use sempsync_core::rpc::xml_to_value;

    #[test]
    fn magic_queue_request_escapes_pattern() {
        let name = xml_escape("#mqtt/<pattern>");
        assert_eq!(name, "#mqtt/&lt;pattern&gt;");
    }

    #[test]
    fn service_reply_paths_match_wire_shape() {
        let reply = xml_to_value(
            r#"<rpc-reply semp-version="soltr/9_5">
                 <rpc><show><service><services>
                   <service><name>SEMP</name><port>8080</port></service>
                   <service><name>SMF</name><port>55555</port></service>
                 </services></service></show></rpc>
                 <execute-result code="ok"/>
               </rpc-reply>"#,
        )
        .unwrap();
        let services =
            value_at_path(&reply, &["rpc-reply", "rpc", "show", "service", "services"]).unwrap();
        let list = services["service"].as_array().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0]["name"], json!("SEMP"));
        assert_eq!(list[1]["port"], json!("55555"));
    }

    #[test]
    fn router_name_reply_path() {
        let reply = xml_to_value(
            r#"<rpc-reply>
                 <rpc><show><router-name><router-name>v_broker_1</router-name></router-name></show></rpc>
                 <execute-result code="ok"/>
               </rpc-reply>"#,
        )
        .unwrap();
        let name = value_at_path(
            &reply,
            &["rpc-reply", "rpc", "show", "router-name", "router-name"],
        )
        .unwrap();
        assert_eq!(name, &json!("v_broker_1"));
    }
}
