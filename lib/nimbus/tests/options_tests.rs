//! `#[derive(Options)]` from a downstream crate's point of view.

use std::collections::BTreeMap;

use assert2::{check, let_assert};
use bytes::Bytes;
use nimbus::{Error, Extended, NameTable, Options, ToBody, ToQuery, build_query};
use serde_json::json;

#[derive(Debug, Default, Options)]
struct Paging {
    #[opts(query)]
    limit: u32,
    #[opts(query)]
    marker: String,
}

#[derive(Debug, Default, Options)]
struct PortListOpts {
    #[opts(query, required)]
    network_id: String,
    #[opts(query = "device_owner")]
    owner: String,
    #[opts(query, format = "csv")]
    fixed_ips: Vec<String>,
    #[opts(query)]
    security_groups: Vec<String>,
    #[opts(query)]
    admin_state_up: Option<bool>,
    #[opts(flatten)]
    paging: Paging,
    #[opts(skip)]
    #[allow(dead_code)]
    cache_hint: u64,
}

#[derive(Debug, Default, Options)]
#[opts(root = "port", rename_all = "camelCase")]
struct PortCreateOpts {
    #[opts(required, body = "network_id")]
    network_id: String,
    display_name: String,
    admin_state_up: Option<bool>,
    binding_profile: BTreeMap<String, String>,
    #[opts(lookup(key = "securityGroupId", kind = "security_group"))]
    security_group_name: String,
    blob: Bytes,
    #[opts(ignore)]
    #[allow(dead_code)]
    local_note: String,
}

#[derive(Debug, Default, Options)]
struct QosExt {
    qos_policy_id: Option<String>,
}

#[derive(Debug, Default, Options)]
struct TagExt {
    tags: Vec<String>,
}

#[derive(Debug, Default, Options)]
#[opts(root = "quota")]
struct QuotaOpts {
    #[opts(query, keep_zero)]
    force: bool,
    #[opts(keep_zero)]
    ports: i64,
    networks: i64,
}

#[test]
fn query_in_declaration_order_with_flatten() {
    let opts = PortListOpts {
        network_id: "net-1".to_string(),
        owner: "network:router_interface".to_string(),
        fixed_ips: vec!["10.0.0.1".to_string(), "10.0.0.2".to_string()],
        security_groups: vec!["sg-1".to_string(), "sg-2".to_string()],
        admin_state_up: Some(false),
        paging: Paging {
            limit: 50,
            marker: "p-9".to_string(),
        },
        cache_hint: 7,
    };

    insta::assert_snapshot!(
        opts.to_query().expect("query"),
        @"?network_id=net-1&device_owner=network%3Arouter_interface&fixed_ips=10.0.0.1%2C10.0.0.2&security_groups=sg-1&security_groups=sg-2&admin_state_up=false&limit=50&marker=p-9"
    );
}

#[test]
fn zero_fields_are_omitted_from_queries() {
    let opts = PortListOpts {
        network_id: "net-1".to_string(),
        ..PortListOpts::default()
    };

    insta::assert_snapshot!(build_query(&opts).expect("query"), @"?network_id=net-1");
}

#[test]
fn keep_zero_emits_zero_values() {
    let opts = QuotaOpts::default();

    insta::assert_snapshot!(opts.to_query().expect("query"), @"?force=false");
    check!(opts.to_body().expect("body").into_value() == json!({"quota": {"ports": 0}}));
}

#[test]
fn required_query_field_aborts() {
    let_assert!(Err(Error::MissingRequiredField { field: "network_id" }) = PortListOpts::default().to_query());
}

#[test]
fn body_keys_follow_rename_all() {
    let opts = PortCreateOpts {
        network_id: "net-1".to_string(),
        display_name: "uplink".to_string(),
        admin_state_up: Some(false),
        binding_profile: BTreeMap::from([("host".to_string(), "cn-3".to_string())]),
        blob: Bytes::from_static(&[0xff, 0x00]),
        local_note: "not sent".to_string(),
        ..PortCreateOpts::default()
    };

    let body = opts.to_body().expect("body");

    check!(
        body.into_value()
            == json!({"port": {
                "network_id": "net-1",
                "displayName": "uplink",
                "adminStateUp": false,
                "bindingProfile": {"host": "cn-3"},
                "blob": "/wA="
            }})
    );
}

#[test]
fn lookup_goes_through_the_collaborator() {
    let opts = PortCreateOpts {
        network_id: "net-1".to_string(),
        security_group_name: "web".to_string(),
        ..PortCreateOpts::default()
    };
    let table = NameTable::new().with("security_group", "web", "sg-7");

    let body = opts.to_body_with(Some(&table)).expect("body");
    check!(body.into_value() == json!({"port": {"network_id": "net-1", "securityGroupId": "sg-7"}}));

    let_assert!(Err(Error::NoLookupCapability { field: "security_group_name" }) = opts.to_body());
    let_assert!(
        Err(Error::NotFoundLookup { .. }) = opts.to_body_with(Some(&NameTable::new()))
    );
}

#[test]
fn extensions_stack_on_derived_options() {
    let base = PortCreateOpts {
        network_id: "net-1".to_string(),
        ..PortCreateOpts::default()
    };
    let opts = Extended::new(
        Extended::new(
            base,
            "port",
            QosExt {
                qos_policy_id: Some(String::new()),
            },
        ),
        "port",
        TagExt {
            tags: vec!["edge".to_string()],
        },
    );

    let body = opts.to_body().expect("body");

    check!(
        body.into_value()
            == json!({"port": {"network_id": "net-1", "qos_policy_id": null, "tags": ["edge"]}})
    );
}

#[test]
fn extension_keeps_base_errors() {
    let opts = Extended::new(PortCreateOpts::default(), "port", TagExt::default());

    let_assert!(Err(Error::MissingRequiredField { field: "network_id" }) = opts.to_body());
}
