#![allow(clippy::unwrap_used)]
#![recursion_limit = "256"]

use std::sync::Arc;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use eerosync_api::Session;
use eerosync_core::{
    Account, Activity, AdBlockStatus, DerivedAttribute, DeviceCategory, NetworkSetting,
    NightlightMode, ProfileSetting, Resource, ResourceKind,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup(data: Value) -> (MockServer, Account) {
    let server = MockServer::start().await;
    let session = Session::with_client(
        reqwest::Client::new(),
        Url::parse(&server.uri()).unwrap(),
    )
    .with_token(SecretString::from("tok".to_owned()));
    (server, Account::from_data(Arc::new(session), data))
}

fn ok() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "meta": { "code": 200, "server_time": "2024-01-01T00:00:00.000Z" },
        "data": {},
    }))
}

fn snapshot() -> Value {
    json!({
        "log_id": "42",
        "name": "Jane",
        "networks": { "data": [{
            "url": "/2.2/networks/1",
            "name": "Home",
            "password": "hunter2",
            "nickname_label": "Main",
            "geo_ip": { "city": "Portland", "regionName": "Oregon", "countryCode": "US" },
            "premium_status": "active",
            "capabilities": { "premium": { "capable": true } },
            "premium_dns": {
                "ad_block_settings": {
                    "enabled": true,
                    "profiles": ["/2.2/networks/1/profiles/7"]
                },
                "dns_policies": { "block_malware": true }
            },
            "guest_network": { "enabled": false, "name": "Guests" },
            "sqm": false,
            "speed": { "date": "2024-03-01T10:00:00Z", "down": { "value": 512.5, "units": "Mbps" } },
            "updates": { "preferred_update_hour": 3 },
            "resources": {
                "settings": "/2.2/networks/1/settings",
                "insights": "/2.2/networks/1/insights",
                "thread": "/2.2/networks/1/thread",
                "reboot": "/2.2/networks/1/reboot"
            },
            "thread": { "enabled": true },
            "eeros": { "count": 2, "data": [
                {
                    "url": "/2.2/eeros/11",
                    "location": "Office",
                    "model": "eero Pro 6",
                    "gateway": true,
                    "mac_address": "00:11",
                    "led_on": true,
                    "resources": { "led_action": "/2.2/eeros/11/led", "reboot": "/2.2/eeros/11/reboot" }
                },
                {
                    "url": "/2.2/eeros/12",
                    "location": "Hall",
                    "model": "eero Beacon",
                    "nightlight": {
                        "enabled": true,
                        "brightness_percentage": 60,
                        "schedule": { "enabled": false, "on": "20:00", "off": "06:30" }
                    }
                }
            ]},
            "devices": { "count": 3, "data": [
                {
                    "url": "/2.2/networks/1/devices/abc",
                    "nickname": "",
                    "hostname": "laptop",
                    "mac": "aa:bb",
                    "connected": true,
                    "wireless": true,
                    "connection_type": "wireless",
                    "device_type": "laptop_computer",
                    "is_guest": false,
                    "source": { "location": "Office" },
                    "channel": 36,
                    "connectivity": {
                        "signal": "-52 dBm",
                        "rx_rate_info": { "channel_width": "80MHz" }
                    },
                    "interface": { "frequency": "5", "frequency_unit": "GHz" },
                    "last_active": "2024-03-01T09:00:00Z"
                },
                {
                    "url": "/2.2/networks/1/devices/def",
                    "mac": "cc:dd",
                    "connected": true,
                    "wireless": false,
                    "device_type": "television",
                    "is_guest": true
                },
                {
                    "url": "/2.2/networks/1/devices/ghi",
                    "nickname": "Old phone",
                    "connected": false,
                    "device_type": "phone"
                }
            ]},
            "profiles": { "count": 1, "data": [{
                "url": "/2.2/networks/1/profiles/7",
                "name": "Kids",
                "paused": false,
                "premium_dns": { "blocked_applications": ["tiktok", "fortnite"] },
                "unified_content_filters": { "dns_policies": { "safe_search_enabled": true } },
                "devices": [
                    { "url": "/2.2/networks/1/devices/abc", "hostname": "laptop", "connected": true,
                      "last_active": "2024-03-01T09:00:00Z" },
                    { "url": "/2.2/networks/1/devices/ghi", "nickname": "Old phone", "connected": false,
                      "last_active": "2024-02-01T09:00:00Z" }
                ]
            }]},
            "activity": {
                "network": {
                    "blocked_day": [
                        { "insight_type": "blocked", "sum": 12 },
                        { "insight_type": "phishing", "sum": 3 }
                    ]
                },
                "devices": {
                    "inspected_week": [
                        { "insights_url": "/2.2/networks/1/insights/devices/abc", "sum": 77 }
                    ],
                    "data_usage_day": [
                        { "url": "/2.2/networks/1/devices/abc", "download": 10, "upload": 2 }
                    ]
                },
                "eeros": {
                    "data_usage_month": [
                        { "url": "/2.2/eeros/11", "download": 900, "upload": 90 }
                    ]
                }
            }
        }]}
    })
}

// ── Derived reads ───────────────────────────────────────────────────

#[tokio::test]
async fn test_network_reads() {
    let (_server, account) = setup(snapshot()).await;
    let home = account.network("1").unwrap();

    assert_eq!(home.name_unique(), "Home \"Main\" (Portland, Oregon)");
    assert_eq!(home.ad_block_status(), AdBlockStatus::Profile);
    assert!(!home.ad_block());
    assert_eq!(home.block_malware(), Some(true));
    assert_eq!(home.speed_down(), (Some(512.5), Some("Mbps")));
    assert_eq!(home.preferred_update_hour(), Some("3am_4am"));
    assert_eq!(
        home.wifi_uri().as_deref(),
        Some("WIFI:S:Home;H:false;T:WPA/WPA2;P:hunter2;;")
    );
    assert_eq!(
        home.guest_network_wifi_uri().as_deref(),
        Some("WIFI:S:Guests;H:false;T:nopass;;")
    );
    assert_eq!(home.gateway_name(), Some("Office"));
    assert_eq!(home.connected_clients_count(), 2);
    assert_eq!(home.connected_guest_clients_count(), 1);
    assert_eq!(
        home.connected_clients_count_in(DeviceCategory::ComputersPersonal),
        1
    );
    assert_eq!(
        home.connected_guest_clients_count_in(DeviceCategory::Entertainment),
        1
    );

    let blocked = home.blocked(Activity::BlockedDay);
    assert_eq!(blocked.blocked, Some(12));
    assert_eq!(blocked.phishing, Some(3));
    assert_eq!(blocked.malware, None);
    assert_eq!(home.adblock(Activity::AdblockDay), None);
}

#[tokio::test]
async fn test_client_reads() {
    let (_server, account) = setup(snapshot()).await;
    let clients = account.network("1").unwrap().clients();

    let laptop = clients[0];
    assert_eq!(laptop.id(), "abc");
    assert_eq!(laptop.name(), Some("laptop"));
    assert_eq!(laptop.name_connection_type(), "laptop (Wireless)");
    assert_eq!(laptop.signal(), (Some(-52), Some("dBm")));
    assert_eq!(laptop.inspected(Activity::InspectedWeek), Some(77));
    assert_eq!(laptop.data_usage(Activity::DataUsageDay).download, Some(10));

    let tv = clients[1];
    assert_eq!(tv.name(), Some("cc:dd"));
    assert_eq!(tv.name_connection_type(), "cc:dd (Unknown)");
    assert_eq!(tv.signal(), (None, None));
    assert_eq!(tv.device_category(), Some(DeviceCategory::Entertainment));

    let phone = clients[2];
    assert_eq!(phone.name(), Some("Old phone"));
}

#[tokio::test]
async fn test_device_and_nightlight_reads() {
    let (_server, account) = setup(snapshot()).await;
    let devices = account.network("1").unwrap().devices();

    let office = devices[0];
    assert_eq!(office.id(), "11");
    assert_eq!(office.name_long(), "Office Eero");
    assert_eq!(office.connected_clients_names(), vec!["laptop".to_owned()]);
    assert_eq!(office.data_usage(Activity::DataUsageMonth).total(), Some(990));
    assert!(office.nightlight().is_none());

    let hall = devices[1];
    let nightlight = hall.nightlight().unwrap();
    assert_eq!(nightlight.mode(), NightlightMode::Ambient);
    assert_eq!(nightlight.brightness_percentage(), Some(60));
    assert_eq!(nightlight.schedule(), (Some("20:00"), Some("06:30")));
}

#[tokio::test]
async fn test_profile_reads() {
    let (_server, account) = setup(snapshot()).await;
    let profile = account.network("1").unwrap().profiles()[0];

    assert_eq!(profile.id(), "7");
    assert_eq!(profile.name_long(), "Kids Profile");
    assert!(profile.ad_block());
    assert!(profile.block_apps_enabled());
    assert_eq!(profile.setting(ProfileSetting::SafeSearchEnabled), Some(true));
    assert_eq!(profile.setting(ProfileSetting::YoutubeRestricted), None);
    assert_eq!(profile.connected_clients_names(), vec!["laptop"]);
    assert!(profile.connected());
    assert_eq!(
        profile.last_active().unwrap().to_rfc3339(),
        "2024-03-01T09:00:00+00:00"
    );
    assert_eq!(profile.url_insights(), "/2.2/networks/1/insights/profiles/7");
}

#[tokio::test]
async fn test_resources_and_derived_attributes() {
    let (_server, account) = setup(snapshot()).await;

    let kinds: Vec<_> = account.resources().iter().map(Resource::kind).collect();
    assert_eq!(
        kinds,
        vec![
            ResourceKind::Account,
            ResourceKind::Network,
            ResourceKind::Device,
            ResourceKind::Device,
            ResourceKind::Profile,
            ResourceKind::Client,
            ResourceKind::Client,
            ResourceKind::Client,
        ]
    );
    assert!(account.find(ResourceKind::Device, "12").unwrap().is_beacon());

    let profile = account.find(ResourceKind::Profile, "7").unwrap();
    assert_eq!(
        DerivedAttribute::BlockedApps.evaluate(&profile),
        Some(json!(["fortnite", "tiktok"]))
    );

    let laptop = account.find(ResourceKind::Client, "abc").unwrap();
    assert_eq!(
        DerivedAttribute::OperatingBand.evaluate(&laptop),
        Some(json!("5 GHz"))
    );
    assert_eq!(DerivedAttribute::Channel.evaluate(&laptop), Some(json!(36)));
    assert_eq!(
        DerivedAttribute::BandwidthReceive.evaluate(&laptop),
        Some(json!("80MHz"))
    );

    let wired = account.find(ResourceKind::Client, "def").unwrap();
    assert_eq!(DerivedAttribute::Channel.evaluate(&wired), None);

    let network = account.find(ResourceKind::Network, "1").unwrap();
    assert_eq!(
        DerivedAttribute::LastUpdated.evaluate(&network),
        Some(json!("2024-03-01T10:00:00Z"))
    );
}

// ── Mutations ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_setting_issues_single_call() {
    let (server, account) = setup(snapshot()).await;
    Mock::given(method("PUT"))
        .and(path("/2.2/networks/1/settings"))
        .and(body_json(json!({ "sqm": true })))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;

    let home = account.network("1").unwrap();
    assert!(home.set(NetworkSetting::Sqm, true).await.unwrap());
    // The snapshot is not touched.
    assert_eq!(home.sqm(), Some(false));
}

#[tokio::test]
async fn test_wrong_value_type_is_a_silent_noop() {
    let (server, account) = setup(snapshot()).await;
    let home = account.network("1").unwrap();

    assert!(!home.set(NetworkSetting::Sqm, "yes").await.unwrap());
    assert!(!home.set(NetworkSetting::Ddns, 1).await.unwrap());
    let profile = home.profiles()[0];
    assert!(!profile.set(ProfileSetting::Paused, json!(null)).await.unwrap());
    assert!(!profile.set_blocked_applications("tiktok").await.unwrap());
    assert!(!home.clients()[0].set_paused("true").await.unwrap());
    assert!(!home.set_preferred_update_hour("noon").await.unwrap());

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_network_setting_endpoints() {
    let (server, account) = setup(snapshot()).await;
    Mock::given(method("PUT"))
        .and(path("/2.2/networks/1/ddns/disable"))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/2.2/networks/1/guestnetwork"))
        .and(body_json(json!({ "enabled": true })))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/2.2/networks/1/dns_policies/adblock"))
        .and(body_json(json!({ "enable": false })))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/2.2/networks/1/thread/enable"))
        .and(body_json(json!({ "enabled": false })))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/2.2/networks/1/updates/preferred_update_hour"))
        .and(body_json(json!({ "preferred_update_hour": 23 })))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;

    let home = account.network("1").unwrap();
    assert!(home.set(NetworkSetting::Ddns, false).await.unwrap());
    assert!(home.set(NetworkSetting::GuestNetwork, true).await.unwrap());
    assert!(home.set(NetworkSetting::AdBlock, false).await.unwrap());
    assert!(home.set(NetworkSetting::Thread, false).await.unwrap());
    assert!(home.set_preferred_update_hour("11pm_12am").await.unwrap());
}

#[tokio::test]
async fn test_profile_ad_block_removal_keeps_remaining_profiles() {
    let mut data = snapshot();
    data["networks"]["data"][0]["premium_dns"]["ad_block_settings"]["profiles"] =
        json!(["/2.2/networks/1/profiles/7", "/2.2/networks/1/profiles/8"]);
    let (server, account) = setup(data).await;
    Mock::given(method("POST"))
        .and(path("/2.2/networks/1/dns_policies/adblock"))
        .and(body_json(json!({
            "enable": true,
            "profiles": ["/2.2/networks/1/profiles/8"]
        })))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;

    let profile = account.network("1").unwrap().profiles()[0];
    assert!(profile.set(ProfileSetting::AdBlock, false).await.unwrap());
}

#[tokio::test]
async fn test_profile_content_filter_posts_to_profile_policy() {
    let (server, account) = setup(snapshot()).await;
    Mock::given(method("POST"))
        .and(path("/2.2/networks/1/dns_policies/profiles/7"))
        .and(body_json(json!({ "block_gaming_content": true })))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/2.2/networks/1/dns_policies/profiles/7/applications/blocked"))
        .and(body_json(json!({ "applications": ["roblox"] })))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;

    let profile = account.network("1").unwrap().profiles()[0];
    assert!(
        profile
            .set(ProfileSetting::BlockGamingContent, true)
            .await
            .unwrap()
    );
    assert!(
        profile
            .set_blocked_applications(json!(["roblox"]))
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_zero_brightness_turns_status_light_off() {
    let (server, account) = setup(snapshot()).await;
    Mock::given(method("PUT"))
        .and(path("/2.2/eeros/11/led"))
        .and(body_json(json!({ "led_on": false })))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;

    let office = account.network("1").unwrap().devices()[0];
    assert!(office.set_status_light_brightness(0).await.unwrap());
}

#[tokio::test]
async fn test_nightlight_schedule_keeps_other_time() {
    let (server, account) = setup(snapshot()).await;
    Mock::given(method("PUT"))
        .and(path("/2.2/eeros/12/nightlight/settings"))
        .and(body_json(json!({
            "enabled": true,
            "schedule": { "enabled": true, "on": "21:15", "off": "06:30" }
        })))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;

    let hall = account.network("1").unwrap().devices()[1];
    let on = chrono::NaiveTime::from_hms_opt(21, 15, 0).unwrap();
    assert!(hall.nightlight().unwrap().set_schedule_on(on).await.unwrap());
}

#[tokio::test]
async fn test_missing_resource_url_is_reported() {
    let (_server, account) = setup(snapshot()).await;
    let hall = account.network("1").unwrap().devices()[1];
    let err = hall.reboot().await.unwrap_err();
    assert_eq!(err.to_string(), "device 12 has no `reboot` resource URL");
}
