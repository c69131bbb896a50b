//! End-to-end aggregation against a mock catalog backend.

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use achievement_hub::adapter::{RetroAchievementsAdapter, StandaloneAdapter};
use achievement_hub::{
    AchievementType, AdapterContext, Aggregator, CatalogClient, CatalogRegistry, CompareStatus,
    CompletionStatus, Console, ConsoleSource, Game, HubConfig, HubError, NoDelay, SourceAdapter,
};

fn config(server: &MockServer, sources: &[ConsoleSource]) -> HubConfig {
    HubConfig {
        api_url: server.uri(),
        active_sources: sources.to_vec(),
        pacing_delay: Duration::ZERO,
        request_timeout: Duration::from_secs(5),
    }
}

async fn get_json(server: &MockServer, route: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn expect_calls(server: &MockServer, route: &str, status: u16, calls: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({ "ok": status == 200 })))
        .expect(calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn central_tracker_two_phase_fetch() {
    let server = MockServer::start().await;
    get_json(
        &server,
        "/ra/console_data/",
        json!([
            { "ID": 1, "Name": "NES", "Active": 1, "IsGameSystem": "1" },
            { "ID": 2, "Name": "SNES", "Active": true, "IsGameSystem": true }
        ]),
    )
    .await;
    get_json(
        &server,
        "/ra/completion_progress/",
        json!([{ "ID": 10, "Title": "Contra", "ConsoleID": 1, "NumAwardedHardcore": 5, "MaxPossible": 10 }]),
    )
    .await;
    get_json(
        &server,
        "/ra/game_data/1",
        json!([
            { "ID": 10, "Title": "Contra", "ConsoleID": 1, "NumAwardedHardcore": 6, "MaxPossible": 10 },
            { "ID": 11, "Title": "Metroid", "ConsoleID": 1 }
        ]),
    )
    .await;
    get_json(
        &server,
        "/ra/game_data/2",
        json!([{ "ID": 20, "Title": "Super Metroid", "ConsoleID": 2, "CompletionStatus": "MASTERED" }]),
    )
    .await;
    get_json(&server, "/ra/compare_data/", json!([])).await;
    expect_calls(&server, "/ra/write_database/", 200, 1).await;

    let aggregator = Aggregator::with_default_adapters(&config(
        &server,
        &[ConsoleSource::RetroAchievements],
    ))
    .unwrap();
    let mut updates = aggregator.subscribe_registry();

    assert_ok!(aggregator.trigger_full_refresh().await);

    let registry = aggregator.registry().read().await;
    assert_eq!(registry.console_count(), 2);
    assert_eq!(registry.flatten().len(), 3);

    let contra = registry.get(1).unwrap().games.get(10).unwrap();
    assert_eq!(contra.num_awarded_hardcore, 6);
    assert_eq!(contra.console_name, "NES");
    assert_eq!(
        registry.get(2).unwrap().games.get(20).unwrap().completion_status,
        CompletionStatus::Mastered
    );
    assert_eq!(aggregator.progress_counter_for(ConsoleSource::RetroAchievements), 2);

    let last = updates.next().await.unwrap();
    assert_eq!(last.delta[0].id, 20);
}

#[tokio::test]
async fn missing_console_stops_rest_of_batch() {
    let server = MockServer::start().await;
    get_json(&server, "/ra/console_data/", json!([{ "ID": 1, "Name": "NES" }])).await;
    get_json(
        &server,
        "/ra/completion_progress/",
        json!([
            { "ID": 10, "Title": "Contra", "ConsoleID": 1 },
            { "ID": 50, "Title": "Orphan", "ConsoleID": 99 },
            { "ID": 12, "Title": "Kid Icarus", "ConsoleID": 1 }
        ]),
    )
    .await;
    get_json(&server, "/ra/game_data/1", json!([{ "ID": 11, "Title": "Metroid", "ConsoleID": 1 }]))
        .await;
    get_json(&server, "/ra/compare_data/", json!([])).await;
    expect_calls(&server, "/ra/write_database/", 200, 1).await;

    let aggregator = Aggregator::with_default_adapters(&config(
        &server,
        &[ConsoleSource::RetroAchievements],
    ))
    .unwrap();

    assert_ok!(aggregator.trigger_full_refresh().await);

    let registry = aggregator.registry().read().await;
    let nes = registry.get(1).unwrap();
    assert!(nes.games.contains(10));
    assert!(!nes.games.contains(12));
    assert!(nes.games.contains(11));
    assert!(!registry.contains(99));
}

#[tokio::test]
async fn storefront_requests_detail_for_each_owned_game() {
    let server = MockServer::start().await;
    get_json(&server, "/steam/console_data/", json!([{ "ID": 100000, "Name": "Steam" }])).await;
    get_json(
        &server,
        "/steam/owned_games/",
        json!([{ "appid": 440, "name": "TF2" }, { "appid": 620, "name": "Portal 2" }]),
    )
    .await;
    get_json(
        &server,
        "/steam/game_data/440",
        json!({
            "appid": 440,
            "name": "Team Fortress 2",
            "AchievementData": [
                { "apiname": "TF_PLAY", "displayName": "Head of the Class", "percent": 61.2, "achieved": true }
            ]
        }),
    )
    .await;
    get_json(&server, "/steam/game_data/620", json!({ "appid": 620, "name": "Portal 2" })).await;
    expect_calls(&server, "/steam/write_database/", 200, 0).await;

    let aggregator =
        Aggregator::with_default_adapters(&config(&server, &[ConsoleSource::Steam])).unwrap();

    assert_ok!(aggregator.trigger_full_refresh().await);

    let registry = aggregator.registry().read().await;
    let steam = registry.get(100_000).unwrap();
    assert_eq!(steam.games.ids(), &[440, 620]);

    let tf2 = steam.games.get(440).unwrap();
    assert_eq!(tf2.title, "Team Fortress 2");
    assert_eq!(tf2.console_id, 100_000);
    assert_eq!(tf2.achievements.len(), 1);
    assert!(tf2.achievements[0].achieved);
    assert_eq!(aggregator.progress_counter_for(ConsoleSource::Steam), 2);
}

#[tokio::test]
async fn failing_source_keeps_sibling_results() {
    let server = MockServer::start().await;
    get_json(&server, "/steam/console_data/", json!([{ "ID": 100000, "Name": "Steam" }])).await;
    get_json(&server, "/steam/owned_games/", json!([{ "appid": 70, "name": "Half-Life" }])).await;
    get_json(&server, "/steam/game_data/70", json!({ "appid": 70, "name": "Half-Life" })).await;
    expect_calls(&server, "/ps3/console_data/", 500, 1).await;
    expect_calls(&server, "/ps3/game_data/", 200, 0).await;

    let aggregator = Aggregator::with_default_adapters(&config(
        &server,
        &[ConsoleSource::Steam, ConsoleSource::Ps3],
    ))
    .unwrap();

    let err = assert_err!(aggregator.trigger_full_refresh().await);
    match err {
        HubError::PartialFailure { failures, .. } => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].0, ConsoleSource::Ps3);
        }
        other => panic!("expected partial failure, got {:?}", other),
    }

    let registry = aggregator.registry().read().await;
    assert!(registry.get(100_000).unwrap().games.contains(70));
    assert!(!registry.contains(200_000));
}

#[tokio::test]
async fn full_game_detail_persists_then_notifies() {
    let server = MockServer::start().await;
    get_json(&server, "/ps3/console_data/", json!([{ "ID": 200000, "Name": "PlayStation 3" }]))
        .await;
    get_json(
        &server,
        "/ps3/full_game_data/7",
        json!({
            "ID": 7,
            "Title": "Demon's Souls",
            "AchievementData": [
                { "ID": 1, "Title": "Last Trophy", "Points": 90, "Type": "win_condition" },
                { "ID": 2, "Title": "Ostrava", "Points": 15 }
            ]
        }),
    )
    .await;
    expect_calls(&server, "/ps3/write_database/", 200, 1).await;

    let aggregator =
        Aggregator::with_default_adapters(&config(&server, &[ConsoleSource::Ps3])).unwrap();
    assert_ok!(aggregator.request_consoles(&[ConsoleSource::Ps3]).await.into_result());

    let mut updates = aggregator.subscribe_registry();
    let request = Game {
        id: 7,
        console_id: 200_000,
        ..Default::default()
    };
    let game = aggregator.request_game(&request).await.unwrap();

    assert_eq!(game.achievements.len(), 2);
    assert_eq!(game.achievements[0].kind, Some(AchievementType::WinCondition));
    assert_eq!(game.achievements[1].kind, None);
    assert_eq!(game.console_name, "PlayStation 3");

    let change = updates.next().await.unwrap();
    assert_eq!(change.delta.len(), 1);
    assert_eq!(change.delta[0].title, "Demon's Souls");
}

#[tokio::test]
async fn full_game_detail_survives_persist_failure() {
    let server = MockServer::start().await;
    get_json(&server, "/xbox360/full_game_data/3", json!({ "ID": 3, "Title": "Halo 3" })).await;
    expect_calls(&server, "/xbox360/write_database/", 503, 1).await;

    let client = Arc::new(CatalogClient::new(server.uri(), Duration::from_secs(5)).unwrap());
    let adapter = StandaloneAdapter::xbox360(client, AdapterContext::new());
    let registry = CatalogRegistry::shared();
    registry
        .write()
        .await
        .upsert_console(Console::new(400_000, "Xbox 360", ConsoleSource::Xbox360));

    let game = assert_ok!(adapter.fetch_full_game_detail(400_000, 3, &registry).await);
    assert_eq!(game.title, "Halo 3");
    assert!(registry.read().await.get(400_000).unwrap().games.contains(3));
}

#[tokio::test]
async fn full_game_detail_without_console_changes_nothing() {
    let server = MockServer::start().await;
    get_json(&server, "/psvita/full_game_data/1", json!({ "ID": 1, "Title": "Gravity Rush" }))
        .await;
    expect_calls(&server, "/psvita/write_database/", 200, 0).await;

    let client = Arc::new(CatalogClient::new(server.uri(), Duration::from_secs(5)).unwrap());
    let adapter = StandaloneAdapter::psvita(client, AdapterContext::new());
    let registry = CatalogRegistry::shared();

    let err = assert_err!(adapter.fetch_full_game_detail(300_000, 1, &registry).await);
    assert!(matches!(
        err,
        HubError::MissingConsole { console_id: 300_000, .. }
    ));
    assert_eq!(registry.read().await.game_count(), 0);
}

#[tokio::test]
async fn compare_data_is_stored_and_published() {
    let server = MockServer::start().await;
    get_json(
        &server,
        "/xbox360/compare_data/",
        json!([
            { "source": "XBOX_360", "consoleId": 400000, "consoleName": "Xbox 360", "name": "Halo 3", "status": "NOT_IN_LOCAL", "databaseStatus": "BEATEN" },
            { "source": "XBOX_360", "consoleId": 400000, "consoleName": "Xbox 360", "name": "Alan Wake", "status": "NOT_IN_LOCAL", "databaseStatus": "TRIED" },
            { "source": "XBOX_360", "consoleId": 400000, "consoleName": "Xbox 360", "name": "Fable II", "status": "OK", "playniteStatus": "BEATEN", "databaseStatus": "BEATEN" }
        ]),
    )
    .await;

    let aggregator =
        Aggregator::with_default_adapters(&config(&server, &[ConsoleSource::Xbox360])).unwrap();
    let mut updates = aggregator.subscribe_reconciliation();

    assert_ok!(aggregator.trigger_reconciliation().await);

    let update = updates.next().await.unwrap();
    assert_eq!(update.delta.source, ConsoleSource::Xbox360);
    assert_eq!(update.delta.records.len(), 3);

    let summary = aggregator.compare_summary().await;
    assert_eq!(summary.ok_count, 1);
    let names: Vec<_> = summary.not_in_local.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Alan Wake", "Halo 3"]);
    assert!(summary
        .not_in_local
        .iter()
        .all(|r| r.status == CompareStatus::NotInLocal));
}

#[tokio::test]
async fn existing_only_refresh_reads_existing_data() {
    let server = MockServer::start().await;
    get_json(&server, "/ra/console_data/", json!([{ "ID": 3, "Name": "Game Boy" }])).await;
    get_json(
        &server,
        "/ra/existing_data/",
        json!([{ "ID": 30, "Title": "Tetris", "ConsoleID": 3 }]),
    )
    .await;
    expect_calls(&server, "/ra/completion_progress/", 200, 0).await;

    let aggregator = Aggregator::with_default_adapters(&config(
        &server,
        &[ConsoleSource::RetroAchievements],
    ))
    .unwrap();

    assert_ok!(aggregator.trigger_existing_only_refresh().await);
    assert!(aggregator.registry().read().await.get(3).unwrap().games.contains(30));
}

#[tokio::test]
async fn injected_pacing_policy_is_used() {
    let server = MockServer::start().await;
    get_json(&server, "/ra/completion_progress/", json!([])).await;
    get_json(&server, "/ra/game_data/5", json!([])).await;
    get_json(&server, "/ra/compare_data/", json!([])).await;
    expect_calls(&server, "/ra/write_database/", 200, 1).await;

    let client = Arc::new(CatalogClient::new(server.uri(), Duration::from_secs(5)).unwrap());
    let adapter =
        RetroAchievementsAdapter::new(client, AdapterContext::new()).with_pacing(Arc::new(NoDelay));
    let registry = CatalogRegistry::shared();
    registry
        .write()
        .await
        .upsert_console(Console::new(5, "Atari 2600", ConsoleSource::RetroAchievements));

    let started = std::time::Instant::now();
    assert_ok!(adapter.fetch_all_games(&registry).await);

    assert!(started.elapsed() < Duration::from_secs(3));
    assert_eq!(adapter.progress_counter(), 1);
}
