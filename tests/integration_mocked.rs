/// Integration tests with mocked external APIs
/// Tests the provider clients and the lead search workflow without hitting real services
use serde_json::json;
use warehouse_leads_api::config::Config;
use warehouse_leads_api::errors::AppError;
use warehouse_leads_api::lead_search::LeadSearcher;
use warehouse_leads_api::models::{
    LeadSearchRequest, ProviderKind, WarehouseProfile, NOT_AVAILABLE,
};
use warehouse_leads_api::services::{
    build_http_client, LeadProvider, OpenAiLeadService, SerpApiService, SerperService,
};
use warehouse_leads_api::session::LeadSession;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper function to create test config with every provider pointed at the mock server
fn create_test_config(base_url: String, provider: ProviderKind) -> Config {
    Config {
        lead_provider: Some(provider),
        openai_api_key: Some("test_openai_key".to_string()),
        openai_base_url: base_url.clone(),
        serper_api_key: Some("test_serper_key".to_string()),
        serper_base_url: base_url.clone(),
        serpapi_api_key: Some("test_serpapi_key".to_string()),
        serpapi_base_url: base_url,
        lead_count: 3,
        ..Config::default()
    }
}

fn search_request(count: Option<usize>) -> LeadSearchRequest {
    LeadSearchRequest {
        warehouse: WarehouseProfile::default(),
        count,
    }
}

fn chat_completion(content: serde_json::Value) -> serde_json::Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content.to_string()},
            "finish_reason": "stop"
        }]
    })
}

#[tokio::test]
async fn test_openai_generates_leads() {
    let mock_server = MockServer::start().await;

    let leads = json!({
        "leads": [
            {
                "Company Name": "Kalaburagi Agro Foods",
                "Address": "Plot 12, KIADB Industrial Area, Kalaburagi",
                "Person Name": "Ravi Patil",
                "Person Mail ID": "ravi.patil@kalaburagiagro.in",
                "Person LinkedIn Profile ID": "https://www.linkedin.com/in/ravi-patil",
                "Contact Number": "+91 98450 12345",
                "Match Score": "96%"
            },
            {
                "Company Name": "Deccan Consumer Goods",
                "Address": "Station Road, Kalaburagi"
            }
        ]
    });

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test_openai_key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion(leads)))
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri(), ProviderKind::OpenAi);
    let service = OpenAiLeadService::new(build_http_client().unwrap(), &config).unwrap();

    let items = service
        .generate_leads(&WarehouseProfile::default(), 2)
        .await
        .unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["Company Name"], "Kalaburagi Agro Foods");
}

#[tokio::test]
async fn test_openai_error_is_upstream_unavailable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri(), ProviderKind::OpenAi);
    let service = OpenAiLeadService::new(build_http_client().unwrap(), &config).unwrap();

    let result = service.generate_leads(&WarehouseProfile::default(), 5).await;
    assert!(matches!(result, Err(AppError::UpstreamUnavailable(_))));
}

#[tokio::test]
async fn test_openai_invalid_json_content() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "Sorry, I cannot help with that."}}]
        })))
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri(), ProviderKind::OpenAi);
    let service = OpenAiLeadService::new(build_http_client().unwrap(), &config).unwrap();

    let result = service.generate_leads(&WarehouseProfile::default(), 5).await;
    assert!(matches!(result, Err(AppError::UpstreamUnavailable(_))));
}

#[tokio::test]
async fn test_serper_web_search() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .and(header("X-API-KEY", "test_serper_key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "searchParameters": {"q": "test"},
            "organic": [
                {"title": "Deccan FMCG Distributors", "link": "https://deccanfmcg.example", "snippet": "Distributor in Kalaburagi"},
                {"title": "Raichur Foods", "link": "https://www.linkedin.com/company/raichur-foods"}
            ]
        })))
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri(), ProviderKind::WebSearch);
    let service = SerperService::new(build_http_client().unwrap(), &config).unwrap();

    let items = service
        .search_web("FMCG companies near Kalaburagi, Karnataka", 10)
        .await
        .unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[1]["title"], "Raichur Foods");
}

#[tokio::test]
async fn test_serper_places_missing_key_yields_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/places"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"searchParameters": {}})))
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri(), ProviderKind::LocalBusiness);
    let service = SerperService::new(build_http_client().unwrap(), &config).unwrap();

    let items = service.search_places("anything", 10).await.unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn test_serpapi_local_results() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("engine", "google"))
        .and(query_param("api_key", "test_serpapi_key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "local_results": {
                "places": [
                    {"title": "Sharanabasava Tyres", "address": "Ring Road, Kalaburagi", "phone": "08472 245 678"}
                ]
            },
            "organic_results": [{"title": "Ignored"}]
        })))
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri(), ProviderKind::SerpApi);
    let service = SerpApiService::new(build_http_client().unwrap(), &config).unwrap();

    let items = service
        .search("Tire Industries companies near Kalaburagi, Karnataka", 5)
        .await
        .unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Sharanabasava Tyres");
}

#[tokio::test]
async fn test_local_business_search_end_to_end() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/places"))
        .and(header("X-API-KEY", "test_serper_key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "places": [
                {"title": "Kalaburagi Cold Storage", "address": "MSK Mill Road", "phoneNumber": "098450 12345"},
                {"title": "Gulbarga Pulses", "address": "APMC Yard"},
                {"title": "Sedam Cement Traders", "address": "Sedam Road"},
                {"title": "Jewargi Agro", "address": "Jewargi"}
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri(), ProviderKind::LocalBusiness);
    let searcher = LeadSearcher::new(&config).unwrap();
    let mut session = LeadSession::new();

    let outcome = searcher
        .search(&mut session, &search_request(None))
        .await
        .unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.provider, ProviderKind::LocalBusiness);
    // Truncated to the configured lead count
    assert_eq!(outcome.leads.len(), 3);
    assert_eq!(outcome.leads[0].company_name, "Kalaburagi Cold Storage");
    assert_eq!(outcome.leads[0].contact_number, "+919845012345");
    assert_eq!(outcome.leads[0].match_score, "90%");
    assert_eq!(outcome.leads[1].contact_number, NOT_AVAILABLE);
    assert_eq!(outcome.leads[2].match_score, "92%");
    assert_eq!(session.leads, outcome.leads);

    // Same request again is served from the response cache
    let again = searcher
        .search(&mut session, &search_request(None))
        .await
        .unwrap();
    assert!(again.success);
    assert_eq!(again.leads, outcome.leads);
}

#[tokio::test]
async fn test_failed_search_keeps_previous_leads() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri(), ProviderKind::OpenAi);
    let searcher = LeadSearcher::new(&config).unwrap();

    let mut session = LeadSession::new();
    let previous = warehouse_leads_api::mock::generate_mock(2);
    session.replace_leads(previous.clone(), ProviderKind::Mock);

    let outcome = searcher
        .search(&mut session, &search_request(Some(5)))
        .await
        .unwrap();

    assert!(!outcome.success);
    assert!(outcome.message.contains("OpenAI returned status 503"));
    assert_eq!(outcome.leads, previous);
    assert_eq!(session.leads, previous);
    assert_eq!(session.provider, Some(ProviderKind::Mock));
}

#[tokio::test]
async fn test_empty_result_keeps_previous_leads() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion(json!({"leads": []}))))
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri(), ProviderKind::OpenAi);
    let searcher = LeadSearcher::new(&config).unwrap();

    let mut session = LeadSession::new();
    let previous = warehouse_leads_api::mock::generate_mock(1);
    session.replace_leads(previous.clone(), ProviderKind::Mock);

    let outcome = searcher
        .search(&mut session, &search_request(None))
        .await
        .unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.message, AppError::EmptyResultSet.to_string());
    assert_eq!(session.leads, previous);
}

#[tokio::test]
async fn test_generative_search_keeps_model_scores() {
    let mock_server = MockServer::start().await;

    let leads = json!([
        {"Company Name": "Alpha Tyres", "Match Score": "97%"},
        {"Company Name": "Beta Tyres", "Match Score": 88},
        {"Company Name": "Gamma Tyres"}
    ]);

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion(leads)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri(), ProviderKind::OpenAi);
    let provider = LeadProvider::from_config(&config).unwrap();
    let searcher = LeadSearcher::with_provider(provider, &config);
    let mut session = LeadSession::new();

    let outcome = searcher
        .search(&mut session, &search_request(Some(3)))
        .await
        .unwrap();

    let scores: Vec<&str> = outcome.leads.iter().map(|l| l.match_score.as_str()).collect();
    assert_eq!(scores, vec!["97%", "88%", "92%"]);
    assert_eq!(outcome.leads[2].person_email, NOT_AVAILABLE);

    // The cached payload keeps its generative shape, so model scores survive
    let cached = searcher
        .search(&mut session, &search_request(Some(3)))
        .await
        .unwrap();
    assert_eq!(cached.leads, outcome.leads);
}

#[tokio::test]
async fn test_concurrent_searches() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "organic": [{"title": "Shared Result", "snippet": "Reach us at info@shared.example.com"}]
        })))
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri(), ProviderKind::WebSearch);
    let searcher = std::sync::Arc::new(LeadSearcher::new(&config).unwrap());

    let mut handles = vec![];
    for _ in 0..5 {
        let searcher = searcher.clone();
        handles.push(tokio::spawn(async move {
            let mut session = LeadSession::new();
            searcher
                .search(&mut session, &search_request(Some(1)))
                .await
                .map(|outcome| outcome.leads)
        }));
    }

    for handle in handles {
        let leads = handle.await.unwrap().unwrap();
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].person_email, "info@shared.example.com");
    }
}
