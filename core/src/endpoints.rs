//! Endpoint catalog for the mailer API.
//!
//! Each function maps typed arguments to one `Call`: method, path, query or
//! body, and the fixed `CallOptions` for that endpoint. Nothing here performs
//! I/O; pass the result to `Gateway::send`.
//!
//! Health checks and running-campaign stats are polled, so they carry no
//! `loading`/`store` options.

use serde::Serialize;

use crate::call::{Call, CallOptions, Model};
use crate::error::ApiError;
use crate::params::Params;
use crate::types::{CampaignStatus, GraphqlProxy, StatusChange, SubscriberFilter};

fn loading(model: Model) -> CallOptions {
    CallOptions::new().loading(model)
}

fn tracked(model: Model) -> CallOptions {
    CallOptions::new().tracked(model)
}

fn all_pages(params: Option<Params>) -> Params {
    params.unwrap_or_else(|| Params::new().set("per_page", "all"))
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// Health probe. Failures are expected while the server restarts, so no toast.
pub fn get_health() -> Call {
    Call::get("/api/health").options(CallOptions::new().disable_toast())
}

pub fn reload_app() -> Call {
    Call::post("/v1/api/admin/reload")
}

pub fn get_server_config() -> Call {
    Call::get("/api/config").options(tracked(Model::ServerConfig).preserve_case())
}

/// i18n strings are keyed by dotted paths that must stay verbatim.
pub fn get_lang(lang: &str) -> Call {
    Call::get(format!("/api/lang/{lang}")).options(loading(Model::Lang).preserve_case())
}

pub fn get_dashboard_counts() -> Call {
    Call::get("/v1/api/dashboard/counts").options(loading(Model::Dashboard))
}

pub fn get_dashboard_charts() -> Call {
    Call::get("/v1/api/dashboard/charts").options(loading(Model::Dashboard))
}

// ---------------------------------------------------------------------------
// Lists
// ---------------------------------------------------------------------------

/// Without `params`, every list is fetched (`per_page=all`).
pub fn init_lists(params: Option<Params>) -> Call {
    Call::get("/v1/api/initlists")
        .params(all_pages(params))
        .options(tracked(Model::Lists))
}

pub fn get_lists(params: Option<Params>) -> Call {
    Call::get("/v1/api/lists")
        .params(all_pages(params))
        .options(tracked(Model::Lists))
}

pub fn create_list<T: Serialize + ?Sized>(data: &T) -> Result<Call, ApiError> {
    Ok(Call::post("/v1/api/lists").json(data)?.options(loading(Model::Lists)))
}

pub fn update_list<T: Serialize + ?Sized>(id: u64, data: &T) -> Result<Call, ApiError> {
    Ok(Call::put(format!("/v1/api/lists/{id}"))
        .json(data)?
        .options(loading(Model::Lists)))
}

pub fn delete_list(id: u64) -> Call {
    Call::delete(format!("/v1/api/lists/{id}")).options(loading(Model::Lists))
}

// ---------------------------------------------------------------------------
// Subscribers
// ---------------------------------------------------------------------------

pub fn get_subscribers(params: Params) -> Call {
    Call::get("/v1/api/subscribers")
        .params(params)
        .options(tracked(Model::Subscribers))
}

pub fn filter_subscribers(filter: &SubscriberFilter) -> Call {
    Call::get("/v1/api/subscribers/filter").params(filter.to_params())
}

pub fn create_subscriber<T: Serialize + ?Sized>(data: &T) -> Result<Call, ApiError> {
    Ok(Call::post("/v1/api/subscribers")
        .json(data)?
        .options(loading(Model::Subscribers)))
}

pub fn update_subscriber<T: Serialize + ?Sized>(id: u64, data: &T) -> Result<Call, ApiError> {
    Ok(Call::put(format!("/v1/api/subscribers/{id}"))
        .json(data)?
        .options(loading(Model::Subscribers)))
}

pub fn delete_subscriber(id: u64) -> Call {
    Call::delete(format!("/v1/api/subscribers/{id}")).options(loading(Model::Subscribers))
}

pub fn add_subscribers_to_lists<T: Serialize + ?Sized>(data: &T) -> Result<Call, ApiError> {
    Ok(Call::put("/v1/api/subscribers/lists")
        .json(data)?
        .options(loading(Model::Subscribers)))
}

pub fn add_subscribers_to_lists_by_query<T: Serialize + ?Sized>(
    data: &T,
) -> Result<Call, ApiError> {
    Ok(Call::put("/v1/api/subscribers/query/lists")
        .json(data)?
        .options(loading(Model::Subscribers)))
}

pub fn blocklist_subscribers<T: Serialize + ?Sized>(data: &T) -> Result<Call, ApiError> {
    Ok(Call::put("/v1/api/subscribers/blocklist")
        .json(data)?
        .options(loading(Model::Subscribers)))
}

pub fn blocklist_subscribers_by_query<T: Serialize + ?Sized>(
    data: &T,
) -> Result<Call, ApiError> {
    Ok(Call::put("/v1/api/subscribers/query/blocklist")
        .json(data)?
        .options(loading(Model::Subscribers)))
}

/// Bulk delete; pass ids as a list param (`id=1&id=2`).
pub fn delete_subscribers(params: Params) -> Call {
    Call::delete("/v1/api/subscribers")
        .params(params)
        .options(loading(Model::Subscribers))
}

pub fn delete_subscribers_by_query<T: Serialize + ?Sized>(data: &T) -> Result<Call, ApiError> {
    Ok(Call::post("/v1/api/subscribers/query/delete")
        .json(data)?
        .options(loading(Model::Subscribers)))
}

// ---------------------------------------------------------------------------
// Subscriber import
// ---------------------------------------------------------------------------

pub fn import_subscribers<T: Serialize + ?Sized>(data: &T) -> Result<Call, ApiError> {
    Call::post("/v1/api/import/subscribers").json(data)
}

pub fn get_import_status() -> Call {
    Call::get("/v1/api/import/subscribers")
}

pub fn get_import_logs() -> Call {
    Call::get("/v1/api/import/subscribers/logs").options(CallOptions::new().preserve_case())
}

pub fn stop_import() -> Call {
    Call::delete("/v1/api/import/subscribers")
}

// ---------------------------------------------------------------------------
// Campaigns
// ---------------------------------------------------------------------------

pub fn get_campaigns(params: Params) -> Call {
    Call::get("/v1/api/campaigns")
        .params(params)
        .options(tracked(Model::Campaigns))
}

pub fn get_campaign(id: u64) -> Call {
    Call::get(format!("/v1/api/campaigns/{id}")).options(loading(Model::Campaigns))
}

/// Polled while campaigns run.
pub fn get_campaign_stats() -> Call {
    Call::get("/v1/api/campaigns/running/stats")
}

pub fn create_campaign<T: Serialize + ?Sized>(data: &T) -> Result<Call, ApiError> {
    Ok(Call::post("/v1/api/campaigns")
        .json(data)?
        .options(loading(Model::Campaigns)))
}

pub fn convert_campaign_content<T: Serialize + ?Sized>(
    id: u64,
    data: &T,
) -> Result<Call, ApiError> {
    Ok(Call::post(format!("/v1/api/campaigns/{id}/content"))
        .json(data)?
        .options(loading(Model::Campaigns)))
}

pub fn test_campaign<T: Serialize + ?Sized>(id: u64, data: &T) -> Result<Call, ApiError> {
    Ok(Call::post(format!("/v1/api/campaigns/{id}/test"))
        .json(data)?
        .options(loading(Model::Campaigns)))
}

pub fn update_campaign<T: Serialize + ?Sized>(id: u64, data: &T) -> Result<Call, ApiError> {
    Ok(Call::put(format!("/v1/api/campaigns/{id}"))
        .json(data)?
        .options(loading(Model::Campaigns)))
}

pub fn change_campaign_status(id: u64, status: CampaignStatus) -> Result<Call, ApiError> {
    Ok(Call::put(format!("/v1/api/campaigns/{id}/status"))
        .json(&StatusChange { status })?
        .options(loading(Model::Campaigns)))
}

pub fn delete_campaign(id: u64) -> Call {
    Call::delete(format!("/v1/api/campaigns/{id}")).options(loading(Model::Campaigns))
}

// ---------------------------------------------------------------------------
// Media
// ---------------------------------------------------------------------------

pub fn get_media() -> Call {
    Call::get("/v1/api/media").options(tracked(Model::Media))
}

pub fn upload_media<T: Serialize + ?Sized>(data: &T) -> Result<Call, ApiError> {
    Ok(Call::post("/v1/api/media").json(data)?.options(loading(Model::Media)))
}

pub fn delete_media(id: u64) -> Call {
    Call::delete(format!("/v1/api/media/{id}")).options(loading(Model::Media))
}

// ---------------------------------------------------------------------------
// Billing and proxy
// ---------------------------------------------------------------------------

pub fn checkout<T: Serialize + ?Sized>(data: &T) -> Result<Call, ApiError> {
    Call::post("/v1/api/checkout/email/plan").json(data)
}

pub fn proxy_graphql(request: &GraphqlProxy) -> Result<Call, ApiError> {
    Call::post("/v1/api/settings/proxy/graphql").json(request)
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

pub fn create_template<T: Serialize + ?Sized>(data: &T) -> Result<Call, ApiError> {
    Ok(Call::post("/v1/api/templates")
        .json(data)?
        .options(loading(Model::Templates)))
}

pub fn get_templates() -> Call {
    Call::get("/v1/api/templates").options(tracked(Model::Templates))
}

pub fn update_template<T: Serialize + ?Sized>(id: u64, data: &T) -> Result<Call, ApiError> {
    Ok(Call::put(format!("/v1/api/templates/{id}"))
        .json(data)?
        .options(loading(Model::Templates)))
}

pub fn make_template_default(id: u64) -> Result<Call, ApiError> {
    Ok(Call::put(format!("/v1/api/templates/{id}/default"))
        .json(&serde_json::json!({}))?
        .options(loading(Model::Templates)))
}

pub fn delete_template(id: u64) -> Call {
    Call::delete(format!("/v1/api/templates/{id}")).options(loading(Model::Templates))
}

// ---------------------------------------------------------------------------
// Settings and logs
// ---------------------------------------------------------------------------

/// Setting keys are stored verbatim (`app.root_url`), hence `preserve_case`.
pub fn init_settings() -> Call {
    Call::get("/v1/api/initsettings").options(tracked(Model::Settings).preserve_case())
}

pub fn get_settings() -> Call {
    Call::get("/v1/api/settings").options(tracked(Model::Settings).preserve_case())
}

pub fn update_settings<T: Serialize + ?Sized>(data: &T) -> Result<Call, ApiError> {
    Ok(Call::put("/v1/api/settings")
        .json(data)?
        .options(loading(Model::Settings)))
}

pub fn get_logs() -> Call {
    Call::get("/v1/api/logs").options(loading(Model::Logs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;
    use serde_json::json;

    #[test]
    fn health_check_suppresses_toast_and_state() {
        let call = get_health();
        assert_eq!(call.method, HttpMethod::Get);
        assert_eq!(call.path, "/api/health");
        assert_eq!(call.options, CallOptions::new().disable_toast());
    }

    #[test]
    fn campaign_stats_has_no_side_effects() {
        let call = get_campaign_stats();
        assert_eq!(call.target(), "/v1/api/campaigns/running/stats");
        assert_eq!(call.options, CallOptions::default());
    }

    #[test]
    fn lists_default_to_all_pages() {
        let call = get_lists(None);
        assert_eq!(call.target(), "/v1/api/lists?per_page=all");
        assert_eq!(call.options.loading, Some(Model::Lists));
        assert_eq!(call.options.store, Some(Model::Lists));

        let call = init_lists(Some(Params::new().set("page", 2)));
        assert_eq!(call.target(), "/v1/api/initlists?page=2");
    }

    #[test]
    fn path_ids_are_interpolated() {
        assert_eq!(delete_list(7).path, "/v1/api/lists/7");
        assert_eq!(get_campaign(12).path, "/v1/api/campaigns/12");
        assert_eq!(delete_media(3).method, HttpMethod::Delete);
        assert_eq!(
            update_subscriber(5, &json!({"name": "x"})).unwrap().path,
            "/v1/api/subscribers/5"
        );
        assert_eq!(
            test_campaign(9, &json!({})).unwrap().path,
            "/v1/api/campaigns/9/test"
        );
    }

    #[test]
    fn bulk_subscriber_delete_repeats_ids() {
        let call = delete_subscribers(Params::new().set_list("id", [4, 5]));
        assert_eq!(call.method, HttpMethod::Delete);
        assert_eq!(call.target(), "/v1/api/subscribers?id=4&id=5");
        assert_eq!(call.options.loading, Some(Model::Subscribers));
        assert_eq!(call.options.store, None);
    }

    #[test]
    fn campaign_status_body() {
        let call = change_campaign_status(3, CampaignStatus::Paused).unwrap();
        assert_eq!(call.method, HttpMethod::Put);
        assert_eq!(call.path, "/v1/api/campaigns/3/status");
        assert_eq!(call.body.as_deref(), Some(r#"{"status":"paused"}"#));
    }

    #[test]
    fn settings_and_config_preserve_case() {
        for call in [get_server_config(), get_settings(), init_settings()] {
            assert!(call.options.preserve_case);
            assert!(call.options.store.is_some());
        }
        assert!(get_lang("en").options.preserve_case);
        assert_eq!(get_lang("en").path, "/api/lang/en");
        assert!(get_import_logs().options.preserve_case);
    }

    #[test]
    fn template_default_sends_empty_object() {
        let call = make_template_default(2).unwrap();
        assert_eq!(call.path, "/v1/api/templates/2/default");
        assert_eq!(call.body.as_deref(), Some("{}"));
    }

    #[test]
    fn filter_uses_query_params() {
        let filter = SubscriberFilter {
            max_subscribers: 10,
            ..Default::default()
        };
        let call = filter_subscribers(&filter);
        assert!(call.target().starts_with("/v1/api/subscribers/filter?maxsubscribers=10&"));
        assert_eq!(call.options, CallOptions::default());
    }

    #[test]
    fn import_calls_track_nothing() {
        for call in [get_import_status(), stop_import()] {
            assert_eq!(call.options, CallOptions::default());
        }
        assert_eq!(stop_import().method, HttpMethod::Delete);
    }
}
