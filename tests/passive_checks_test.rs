//! Integration tests for the header- and metadata-based checks

mod common;

use common::{harness, test_config};
use sentinel::check::{
    cookies::CookiesCheck, cors::CorsCheck, headers::HeadersCheck, robots::RobotsCheck,
    server_info::ServerInfoCheck, Check, Finding,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_headers_all_present() {
    let mock_server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Security-Policy", "default-src 'self'")
                .insert_header("Strict-Transport-Security", "max-age=31536000")
                .insert_header("X-Frame-Options", "DENY")
                .insert_header("X-Content-Type-Options", "nosniff")
                .insert_header("Referrer-Policy", "no-referrer")
                .insert_header("Permissions-Policy", "geolocation=()"),
        )
        .mount(&mock_server)
        .await;

    let config = test_config(&mock_server.uri());
    let (fetch, target) = harness(&config);

    let finding = HeadersCheck
        .run(&fetch, &target, &config)
        .await
        .expect("Check failed");

    match finding {
        Finding::Headers(f) => {
            assert!(f.csp);
            assert!(f.hsts);
            assert!(f.x_frame_options);
            assert!(f.x_content_type_options);
            assert!(f.referrer_policy);
            assert!(f.permissions_policy);
        }
        other => panic!("Unexpected finding: {other:?}"),
    }
}

#[tokio::test]
async fn test_headers_all_missing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let config = test_config(&mock_server.uri());
    let (fetch, target) = harness(&config);

    let finding = HeadersCheck
        .run(&fetch, &target, &config)
        .await
        .expect("Check failed");

    match finding {
        Finding::Headers(f) => {
            assert!(!f.csp);
            assert!(!f.hsts);
            assert!(!f.x_frame_options);
        }
        other => panic!("Unexpected finding: {other:?}"),
    }
}

#[tokio::test]
async fn test_cors_wildcard_is_misconfigured() {
    let mock_server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200).insert_header("Access-Control-Allow-Origin", "*"))
        .mount(&mock_server)
        .await;

    let config = test_config(&mock_server.uri());
    let (fetch, target) = harness(&config);

    let finding = CorsCheck
        .run(&fetch, &target, &config)
        .await
        .expect("Check failed");

    match finding {
        Finding::Cors(f) => {
            assert!(f.cors_enabled);
            assert!(f.misconfigured);
        }
        other => panic!("Unexpected finding: {other:?}"),
    }
}

#[tokio::test]
async fn test_cors_same_origin_is_fine() {
    let mock_server = MockServer::start().await;
    let origin = mock_server.uri();

    Mock::given(method("HEAD"))
        .respond_with(
            ResponseTemplate::new(200).insert_header("Access-Control-Allow-Origin", origin.as_str()),
        )
        .mount(&mock_server)
        .await;

    let config = test_config(&origin);
    let (fetch, target) = harness(&config);

    let finding = CorsCheck
        .run(&fetch, &target, &config)
        .await
        .expect("Check failed");

    match finding {
        Finding::Cors(f) => {
            assert!(f.cors_enabled);
            assert!(!f.misconfigured);
        }
        other => panic!("Unexpected finding: {other:?}"),
    }
}

#[tokio::test]
async fn test_cookies_flag_coverage() {
    let mock_server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .respond_with(
            ResponseTemplate::new(200)
                .append_header("Set-Cookie", "a=1; Secure; HttpOnly; SameSite=Strict")
                .append_header("Set-Cookie", "b=2; Secure")
                .append_header("Set-Cookie", "c=3"),
        )
        .mount(&mock_server)
        .await;

    let config = test_config(&mock_server.uri());
    let (fetch, target) = harness(&config);

    let finding = CookiesCheck
        .run(&fetch, &target, &config)
        .await
        .expect("Check failed");

    match finding {
        Finding::Cookies(f) => {
            assert_eq!(f.total, 3);
            assert_eq!(f.secure, "2/3");
            assert_eq!(f.http_only, "1/3");
            assert_eq!(f.same_site, "1/3");
        }
        other => panic!("Unexpected finding: {other:?}"),
    }
}

#[tokio::test]
async fn test_server_info_disclosure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200).insert_header("Server", "Apache/2.4.62 (Debian)"))
        .mount(&mock_server)
        .await;

    let config = test_config(&mock_server.uri());
    let (fetch, target) = harness(&config);

    let finding = ServerInfoCheck
        .run(&fetch, &target, &config)
        .await
        .expect("Check failed");

    match finding {
        Finding::ServerInfo(f) => {
            assert_eq!(f.server_header, "Apache/2.4.62 (Debian)");
            assert!(f.information_disclosure);
        }
        other => panic!("Unexpected finding: {other:?}"),
    }
}

#[tokio::test]
async fn test_server_info_not_disclosed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let config = test_config(&mock_server.uri());
    let (fetch, target) = harness(&config);

    let finding = ServerInfoCheck
        .run(&fetch, &target, &config)
        .await
        .expect("Check failed");

    match finding {
        Finding::ServerInfo(f) => {
            assert_eq!(f.server_header, "Not disclosed");
            assert!(!f.information_disclosure);
        }
        other => panic!("Unexpected finding: {other:?}"),
    }
}

#[tokio::test]
async fn test_robots_with_sitemap() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("User-agent: *\nDisallow: /admin\nsitemap: /sitemap.xml"),
        )
        .mount(&mock_server)
        .await;

    let config = test_config(&mock_server.uri());
    let (fetch, target) = harness(&config);

    let finding = RobotsCheck
        .run(&fetch, &target, &config)
        .await
        .expect("Check failed");

    match finding {
        Finding::Robots(f) => {
            assert!(f.robots_txt);
            assert!(f.sitemap);
        }
        other => panic!("Unexpected finding: {other:?}"),
    }
}

#[tokio::test]
async fn test_robots_missing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let config = test_config(&mock_server.uri());
    let (fetch, target) = harness(&config);

    let finding = RobotsCheck
        .run(&fetch, &target, &config)
        .await
        .expect("Check failed");

    match finding {
        Finding::Robots(f) => {
            assert!(!f.robots_txt);
            assert!(!f.sitemap);
        }
        other => panic!("Unexpected finding: {other:?}"),
    }
}
