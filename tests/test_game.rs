mod common;

use common::{playing_game, quiet_tunables, seeded_rng, FailingSource, OkSource, DT};
use motion_shooter::bullets::BulletSink;
use motion_shooter::config::Tunables;
use motion_shooter::entities::{EnemyKind, Entity};
use motion_shooter::error::GameError;
use motion_shooter::game::*;
use motion_shooter::snapshot::Shape;

// ── State machine ─────────────────────────────────────────────────────────────

#[test]
fn new_game_waits_on_title() {
    let game = Game::new(Tunables::default(), Box::new(OkSource)).unwrap();
    assert_eq!(game.status(), GameStatus::Title);
    assert_eq!(game.score(), 0);
    assert_eq!(game.final_score(), None);
}

#[test]
fn invalid_tunables_rejected() {
    let t = Tunables {
        max_hp: 0,
        ..Tunables::default()
    };
    assert!(matches!(
        Game::new(t, Box::new(OkSource)),
        Err(GameError::Config(_))
    ));
}

#[test]
fn control_failure_keeps_title() {
    let mut rng = seeded_rng();
    let mut game = Game::new(Tunables::default(), Box::new(FailingSource)).unwrap();
    let err = game.start().unwrap_err();
    assert!(matches!(err, GameError::ControlInit(_)));
    assert!(err.to_string().contains("camera not found"));
    assert_eq!(game.status(), GameStatus::Title);

    // Nothing simulates while on the title screen
    let report = game.tick(DT, &mut rng).unwrap();
    assert_eq!(report, TickReport::default());
    assert_eq!(game.tick_count(), 0);
}

#[test]
fn transitions_only_from_matching_state() {
    let mut game = playing_game(quiet_tunables());
    assert!(matches!(
        game.start(),
        Err(GameError::InvalidTransition { from: GameStatus::Playing, .. })
    ));
    assert!(matches!(
        game.restart(),
        Err(GameError::InvalidTransition { from: GameStatus::Playing, .. })
    ));
    assert_eq!(game.status(), GameStatus::Playing);
}

#[test]
fn rejects_bad_delta() {
    let mut rng = seeded_rng();
    let mut game = playing_game(quiet_tunables());
    assert!(matches!(game.tick(-0.1, &mut rng), Err(GameError::InvalidDelta(_))));
    assert!(matches!(game.tick(f32::NAN, &mut rng), Err(GameError::InvalidDelta(_))));
    assert!(matches!(
        game.tick(f32::INFINITY, &mut rng),
        Err(GameError::InvalidDelta(_))
    ));
    assert_eq!(game.tick_count(), 0);

    assert!(game.tick(0.0, &mut rng).is_ok());
    assert_eq!(game.tick_count(), 1);
}

// ── Bullets × enemies ─────────────────────────────────────────────────────────

#[test]
fn bullet_kills_normal_enemy() {
    let mut rng = seeded_rng();
    let mut game = playing_game(quiet_tunables());
    game.enemies_mut().spawn_at(EnemyKind::Normal, 390.0, 300.0);
    game.bullets_mut().fire_from_player(398.0, 320.0);

    let report = game.tick(DT, &mut rng).unwrap();
    assert_eq!(report.kills, 1);
    assert_eq!(game.score(), 10);
    assert!(game.enemies().is_empty());
    assert_eq!(game.bullets().active_bullets().count(), 0);
    assert!(!game.effects().particles().is_empty());
}

#[test]
fn strong_enemy_takes_three_hits() {
    let mut rng = seeded_rng();
    let mut game = playing_game(quiet_tunables());
    game.enemies_mut().spawn_at(EnemyKind::Strong, 390.0, 300.0);

    for expected_hp in [2, 1] {
        game.bullets_mut().fire_from_player(398.0, 320.0);
        let report = game.tick(DT, &mut rng).unwrap();
        assert_eq!(report.hits, 1);
        assert_eq!(report.kills, 0);
        let hp = game.enemies().active_enemies().next().map(|e| e.hp());
        assert_eq!(hp, Some(expected_hp));
        assert_eq!(game.score(), 0);
    }

    game.bullets_mut().fire_from_player(398.0, 320.0);
    let report = game.tick(DT, &mut rng).unwrap();
    assert_eq!(report.kills, 1);
    assert_eq!(game.score(), 50);
    assert!(game.enemies().is_empty());
}

#[test]
fn bullet_spent_on_first_enemy_only() {
    let mut rng = seeded_rng();
    let mut game = playing_game(quiet_tunables());
    game.enemies_mut().spawn_at(EnemyKind::Normal, 390.0, 300.0);
    game.enemies_mut().spawn_at(EnemyKind::Normal, 395.0, 300.0);
    game.bullets_mut().fire_from_player(398.0, 320.0);

    let report = game.tick(DT, &mut rng).unwrap();
    assert_eq!(report.kills, 1);
    assert_eq!(game.score(), 10);
    assert_eq!(game.enemies().len(), 1);
}

#[test]
fn destroyed_enemy_not_scored_twice() {
    let mut rng = seeded_rng();
    let mut game = playing_game(quiet_tunables());
    game.enemies_mut().spawn_at(EnemyKind::Normal, 390.0, 300.0);
    game.bullets_mut().fire_from_player(398.0, 320.0);
    game.bullets_mut().fire_from_player(402.0, 320.0);

    let report = game.tick(DT, &mut rng).unwrap();
    assert_eq!(report.kills, 1);
    assert_eq!(game.score(), 10);
    // The second bullet found nothing left to hit and flies on
    assert_eq!(game.bullets().active_bullets().count(), 1);
}

// ── Enemies × player ──────────────────────────────────────────────────────────

#[test]
fn contact_hurts_player_and_removes_enemy() {
    let mut rng = seeded_rng();
    let mut game = playing_game(quiet_tunables());
    game.enemies_mut().spawn_at(EnemyKind::Normal, 380.0, 480.0);

    let report = game.tick(DT, &mut rng).unwrap();
    assert_eq!(report.damage_taken, 1);
    assert_eq!(game.player().hp(), 2);
    assert!(game.player().is_invincible());
    assert_eq!(game.score(), 0, "contact kills are not scored");
    assert!(game.enemies().is_empty());
    assert!(game.effects().is_shaking());
}

#[test]
fn contact_while_invincible_costs_nothing() {
    let mut rng = seeded_rng();
    let mut game = playing_game(quiet_tunables());
    game.enemies_mut().spawn_at(EnemyKind::Normal, 380.0, 480.0);
    game.tick(DT, &mut rng).unwrap();

    game.enemies_mut().spawn_at(EnemyKind::Normal, 380.0, 480.0);
    let report = game.tick(DT, &mut rng).unwrap();
    assert_eq!(report.damage_taken, 0);
    assert_eq!(game.player().hp(), 2);
    // The enemy is still destroyed on contact
    assert!(game.enemies().is_empty());
}

#[test]
fn last_life_ends_the_game() {
    let mut rng = seeded_rng();
    let mut game = playing_game(Tunables {
        max_hp: 1,
        ..quiet_tunables()
    });
    game.enemies_mut().spawn_at(EnemyKind::Normal, 380.0, 480.0);

    let report = game.tick(DT, &mut rng).unwrap();
    assert!(report.game_over);
    assert_eq!(game.status(), GameStatus::GameOver);
    assert_eq!(game.final_score(), Some(0));
    assert!(!game.player().is_active());

    // Frozen: later ticks only age effects
    let ticks = game.tick_count();
    let report = game.tick(DT, &mut rng).unwrap();
    assert_eq!(report, TickReport::default());
    assert_eq!(game.tick_count(), ticks);
}

// ── Enemy fire × player ───────────────────────────────────────────────────────

#[test]
fn enemy_bullet_hurts_player() {
    let mut rng = seeded_rng();
    let mut game = playing_game(quiet_tunables());
    game.bullets_mut().fire_from_enemy(400.0, 495.0);

    let report = game.tick(DT, &mut rng).unwrap();
    assert_eq!(report.damage_taken, 1);
    assert_eq!(game.player().hp(), 2);
    assert_eq!(game.bullets().active_enemy_bullets().count(), 0);
}

#[test]
fn enemy_bullet_passes_invincible_player() {
    let mut rng = seeded_rng();
    let mut game = playing_game(quiet_tunables());
    game.bullets_mut().fire_from_enemy(400.0, 495.0);
    game.tick(DT, &mut rng).unwrap();

    game.bullets_mut().fire_from_enemy(400.0, 495.0);
    let report = game.tick(DT, &mut rng).unwrap();
    assert_eq!(report.damage_taken, 0);
    assert_eq!(game.player().hp(), 2);
    assert_eq!(game.bullets().active_enemy_bullets().count(), 1);
}

// ── Controls ──────────────────────────────────────────────────────────────────

#[test]
fn move_signal_steers_player() {
    let mut rng = seeded_rng();
    let mut game = playing_game(quiet_tunables());
    game.signals().on_move(0.0);
    game.tick(DT, &mut rng).unwrap();
    assert_eq!(game.player().target_x(), 0.0);
    assert!(game.player().x < 380.0);
}

#[test]
fn fire_pulses_are_debounced() {
    let mut rng = seeded_rng();
    let mut game = playing_game(Tunables {
        fire_interval: 0,
        ..quiet_tunables()
    });
    let signals = game.signals();

    let mut fired_on = Vec::new();
    for _ in 0..12 {
        signals.on_fire_pulse();
        if game.tick(DT, &mut rng).unwrap().fired {
            fired_on.push(game.tick_count());
        }
    }
    assert_eq!(fired_on, [1, 7]);
    assert_eq!(game.bullets().active_bullets().count(), 2);
}

#[test]
fn fire_pulse_respects_player_fire_rate() {
    let mut rng = seeded_rng();
    let mut game = playing_game(quiet_tunables());
    let signals = game.signals();

    let mut fired_on = Vec::new();
    for _ in 0..30 {
        signals.on_fire_pulse();
        if game.tick(DT, &mut rng).unwrap().fired {
            fired_on.push(game.tick_count());
        }
    }
    assert_eq!(fired_on, [13, 25]);
}

#[test]
fn bomb_clears_screen_and_scores() {
    let mut rng = seeded_rng();
    let mut game = playing_game(quiet_tunables());
    for x in [100.0, 300.0, 600.0] {
        game.enemies_mut().spawn_at(EnemyKind::Normal, x, 100.0);
    }
    game.signals().on_bomb_trigger(80.0);

    let report = game.tick(DT, &mut rng).unwrap();
    assert!(report.bomb);
    assert_eq!(report.bomb_kills, 3);
    assert_eq!(game.score(), 3 * BOMB_KILL_SCORE);
    assert!(game.enemies().is_empty());
    assert!(game.player().is_bomb_active());
    assert!(game.effects().flash_alpha() > 0.0);
}

#[test]
fn weak_charge_does_not_bomb() {
    let mut rng = seeded_rng();
    let mut game = playing_game(quiet_tunables());
    game.enemies_mut().spawn_at(EnemyKind::Normal, 100.0, 100.0);
    game.signals().on_bomb_trigger(20.0);

    let report = game.tick(DT, &mut rng).unwrap();
    assert!(!report.bomb);
    assert_eq!(game.enemies().len(), 1);
    assert_eq!(game.player().bomb_cooldown(), 0);
}

#[test]
fn ungated_bomb_ignores_charge() {
    let mut rng = seeded_rng();
    let mut game = playing_game(Tunables {
        bomb_requires_charge: false,
        ..quiet_tunables()
    });
    game.signals().on_bomb_trigger(0.0);
    assert!(game.tick(DT, &mut rng).unwrap().bomb);
}

#[test]
fn active_bomb_shields_against_contact() {
    let mut rng = seeded_rng();
    let mut game = playing_game(quiet_tunables());
    game.signals().on_bomb_trigger(100.0);
    game.tick(DT, &mut rng).unwrap();

    game.enemies_mut().spawn_at(EnemyKind::Normal, 380.0, 480.0);
    game.bullets_mut().fire_from_enemy(400.0, 495.0);
    let report = game.tick(DT, &mut rng).unwrap();
    assert_eq!(report.damage_taken, 0);
    assert_eq!(game.player().hp(), 3);
    assert_eq!(game.enemies().len(), 1, "contact pass skipped while bombing");
}

#[test]
fn charge_level_reaches_hud() {
    let mut rng = seeded_rng();
    let mut game = playing_game(quiet_tunables());
    game.signals().on_bomb_charge(40.0);
    game.tick(DT, &mut rng).unwrap();
    let hud = game.hud();
    assert_eq!(hud.bomb_charge, 40.0);
    assert_eq!(hud.status, GameStatus::Playing);
    assert_eq!((hud.hp, hud.max_hp), (3, 3));
}

// ── Difficulty ────────────────────────────────────────────────────────────────

#[test]
fn difficulty_rises_on_schedule() {
    let mut rng = seeded_rng();
    let mut game = playing_game(Tunables {
        difficulty_interval: 10,
        ..quiet_tunables()
    });
    for _ in 0..9 {
        assert!(!game.tick(DT, &mut rng).unwrap().difficulty_raised);
    }
    assert!(game.tick(DT, &mut rng).unwrap().difficulty_raised);
    assert_eq!(game.enemies().spawn_interval(), 100_000 - 5);
}

#[test]
fn difficulty_stops_at_floor() {
    let mut rng = seeded_rng();
    let mut game = playing_game(Tunables {
        spawn_interval: 40,
        spawn_interval_min: 30,
        difficulty_interval: 1,
        ..Tunables::default()
    });
    for _ in 0..10 {
        game.tick(DT, &mut rng).unwrap();
    }
    assert_eq!(game.enemies().spawn_interval(), 30);
}

#[test]
fn default_pacing_spawns_first_enemy_at_two_seconds() {
    let mut rng = seeded_rng();
    let mut game = playing_game(Tunables::default());
    for _ in 0..119 {
        game.tick(DT, &mut rng).unwrap();
    }
    assert!(game.enemies().is_empty());
    game.tick(DT, &mut rng).unwrap();
    assert_eq!(game.enemies().len(), 1);
}

// ── Restart and determinism ───────────────────────────────────────────────────

#[test]
fn restart_resets_session() {
    let mut rng = seeded_rng();
    let mut game = playing_game(Tunables {
        max_hp: 1,
        difficulty_interval: 10,
        ..quiet_tunables()
    });
    game.enemies_mut().spawn_at(EnemyKind::Normal, 100.0, 100.0);
    game.signals().on_bomb_trigger(100.0);
    game.tick(DT, &mut rng).unwrap();
    assert_eq!(game.score(), BOMB_KILL_SCORE);

    // Wait out the bomb, then walk into an enemy
    for _ in 0..60 {
        game.tick(DT, &mut rng).unwrap();
    }
    assert!(game.enemies().spawn_interval() < 100_000);

    // Leave a live enemy and a player shot in flight, well clear of each other
    game.enemies_mut().spawn_at(EnemyKind::Strong, 100.0, 100.0);
    game.bullets_mut().fire_from_player(600.0, 300.0);
    game.enemies_mut().spawn_at(EnemyKind::Normal, 380.0, 480.0);
    game.tick(DT, &mut rng).unwrap();
    assert_eq!(game.status(), GameStatus::GameOver);
    assert_eq!(game.final_score(), Some(BOMB_KILL_SCORE));
    assert_eq!(game.enemies().len(), 1);
    assert_eq!(game.bullets().active_bullets().count(), 1);

    game.restart().unwrap();
    assert_eq!(game.status(), GameStatus::Playing);
    assert_eq!(game.score(), 0);
    assert_eq!(game.final_score(), None);
    assert_eq!(game.tick_count(), 0);
    assert_eq!(game.player().hp(), 1);
    assert!(game.player().is_active());
    assert_eq!(game.player().bomb_cooldown(), 0);
    assert!(game.enemies().is_empty());
    assert!(game.bullets().is_empty());
    assert_eq!(game.enemies().spawn_interval(), 100_000);
    assert!(game.effects().particles().is_empty());
}

#[test]
fn same_seed_same_run() {
    let run = || {
        let mut rng = seeded_rng();
        let mut game = playing_game(Tunables::default());
        let signals = game.signals();
        for tick in 0..900u32 {
            signals.on_move((tick as f32 * 0.013).sin() * 0.5 + 0.5);
            if tick % 8 == 0 {
                signals.on_fire_pulse();
            }
            game.tick(DT, &mut rng).unwrap();
        }
        let enemies: Vec<(EnemyKind, f32, f32)> = game
            .enemies()
            .active_enemies()
            .map(|e| (e.kind(), e.x, e.y))
            .collect();
        (game.hud(), enemies)
    };
    assert_eq!(run(), run());
}

// ── Snapshot ──────────────────────────────────────────────────────────────────

#[test]
fn snapshot_reflects_state() {
    let mut rng = seeded_rng();
    let mut game = playing_game(quiet_tunables());
    game.enemies_mut().spawn_at(EnemyKind::Strong, 100.0, 100.0);
    game.enemies_mut().spawn_at(EnemyKind::Normal, 200.0, 100.0);
    game.bullets_mut().fire_from_player(600.0, 300.0);
    game.tick(DT, &mut rng).unwrap();

    let frame = game.snapshot(&mut rng);
    assert_eq!(frame.enemies.len(), 2);
    let strong = frame
        .enemies
        .iter()
        .find(|e| e.kind == EnemyKind::Strong)
        .unwrap();
    assert_eq!(strong.hp_ratio, Some(1.0));
    let normal = frame
        .enemies
        .iter()
        .find(|e| e.kind == EnemyKind::Normal)
        .unwrap();
    assert_eq!(normal.hp_ratio, None);
    assert_eq!(normal.sprite.shape, Shape::Circle);

    assert_eq!(frame.bullets.len(), 1);
    assert_eq!(frame.player.sprite.rect, game.player().bounds());
    assert!(frame.player.visible);
    assert_eq!(frame.player.halo, None);
    assert_eq!(frame.hud, game.hud());
}

#[test]
fn snapshot_shows_bomb_state() {
    let mut rng = seeded_rng();
    let mut game = playing_game(quiet_tunables());
    game.signals().on_bomb_trigger(100.0);
    game.tick(DT, &mut rng).unwrap();

    let frame = game.snapshot(&mut rng);
    assert!(frame.player.halo.is_some());
    assert!(frame.player.bomb_ready.is_some());
    assert!(frame.overlay.flash_alpha > 0.0);
    assert!(!frame.rings.is_empty());
    assert!(!frame.particles.is_empty());
}

#[test]
fn hud_serializes_to_json() {
    let game = playing_game(quiet_tunables());
    let json = serde_json::to_value(game.hud()).unwrap();
    assert_eq!(json["status"], "Playing");
    assert_eq!(json["score"], 0);
    assert_eq!(json["hp"], 3);
}
