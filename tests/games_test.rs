//! Integration tests for game persistence and player suggestions.
//!
//! Requires the server to be running on localhost:8000 with a database.

mod common;

use serde_json::{json, Value};

const AFTER_E4: &str = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";

async fn save(path: &str, body: Value) -> Value {
    let resp = common::client()
        .post(common::url(path))
        .json(&body)
        .send()
        .await
        .expect("Failed to send save request");
    assert_eq!(resp.status(), 200, "Save should succeed");
    resp.json().await.unwrap()
}

#[tokio::test]
#[ignore = "requires a running server on localhost:8000"]
async fn save_and_fetch_game() {
    let suffix = common::unique_suffix();
    let white = format!("white{suffix} tester");
    let name = format!("Game {suffix}");

    let saved = save(
        "/api/games",
        json!({ "name": name, "fen": AFTER_E4, "pgn": "1. e4", "white_player": white }),
    )
    .await;
    assert_eq!(saved["name"], name);
    assert_eq!(saved["fen"], AFTER_E4);
    assert_eq!(saved["white_player"], format!("White{suffix} Tester"));
    assert!(saved["black_player"].is_null());

    let id = saved["id"].as_i64().unwrap();
    let resp = common::client()
        .get(common::url(&format!("/api/games/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let fetched: Value = resp.json().await.unwrap();
    assert_eq!(fetched["id"], id);
    assert_eq!(fetched["white_player_id"], saved["white_player_id"]);
}

#[tokio::test]
#[ignore = "requires a running server on localhost:8000"]
async fn default_names_increment() {
    let first = save("/api/games", json!({ "fen": AFTER_E4 })).await;
    let second = save("/api/games", json!({ "fen": AFTER_E4, "name": "ChessGame_1" })).await;

    let n = |v: &Value| -> u64 {
        v["name"].as_str().unwrap().trim_start_matches("ChessGame_").parse().unwrap()
    };
    assert!(n(&second) > n(&first));
}

#[tokio::test]
#[ignore = "requires a running server on localhost:8000"]
async fn lenient_save_accepts_aliases() {
    let suffix = common::unique_suffix();
    let saved = save(
        "/api/save-game",
        json!({
            "position": AFTER_E4,
            "moves": "1. e4",
            "title": format!("Alias {suffix}"),
            "whitePlayer": format!("alias{suffix}"),
            "black": format!("other{suffix}"),
        }),
    )
    .await;

    assert_eq!(saved["fen"], AFTER_E4);
    assert_eq!(saved["pgn"], "1. e4");
    assert_eq!(saved["name"], format!("Alias {suffix}"));
    assert_eq!(saved["white_player"], format!("Alias{suffix}"));
    assert_eq!(saved["black_player"], format!("Other{suffix}"));
}

#[tokio::test]
#[ignore = "requires a running server on localhost:8000"]
async fn players_from_pgn_headers() {
    let suffix = common::unique_suffix();
    let pgn = format!("[White \"hdr{suffix} white\"]\n[Black \"?\"]\n\n1. e4 *");
    let saved = save("/api/games", json!({ "fen": AFTER_E4, "pgn": pgn })).await;

    assert_eq!(saved["white_player"], format!("Hdr{suffix} White"));
    assert!(saved["black_player"].is_null());
}

#[tokio::test]
#[ignore = "requires a running server on localhost:8000"]
async fn player_names_are_case_insensitive() {
    let suffix = common::unique_suffix();
    let a = save("/api/games", json!({ "fen": AFTER_E4, "white_player": format!("case{suffix}") })).await;
    let b = save("/api/games", json!({ "fen": AFTER_E4, "white_player": format!("CASE{suffix}") })).await;
    assert_eq!(a["white_player_id"], b["white_player_id"]);

    let resp = common::client()
        .get(common::url("/api/players/suggestions"))
        .query(&[("prefix", format!("cAsE{suffix}"))])
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let names = body["suggestions"].as_array().unwrap();
    assert_eq!(names.len(), 1);
    assert_eq!(names[0], format!("Case{suffix}"));
}

#[tokio::test]
#[ignore = "requires a running server on localhost:8000"]
async fn short_prefix_gives_no_suggestions() {
    let resp = common::client()
        .get(common::url("/api/players/suggestions?prefix=a"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["suggestions"], json!([]));
}

#[tokio::test]
#[ignore = "requires a running server on localhost:8000"]
async fn list_games_and_missing_game() {
    save("/api/games", json!({ "fen": AFTER_E4 })).await;

    let resp = common::client()
        .get(common::url("/api/games?limit=5"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let games: Value = resp.json().await.unwrap();
    let games = games.as_array().unwrap();
    assert!(!games.is_empty() && games.len() <= 5);

    let resp = common::client()
        .get(common::url("/api/games/999999999"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["detail"], "Game not found");
}

#[tokio::test]
#[ignore = "requires a running server on localhost:8000"]
async fn lenient_save_without_position_is_rejected() {
    let resp = common::client()
        .post(common::url("/api/save-game"))
        .json(&json!({ "pgn": "1. e4" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}
