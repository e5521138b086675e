//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically. Every step
//! below runs in a fixed order; changing it changes replays.

use std::f32::consts::TAU;

use glam::Vec2;

use super::enemy::{Enemy, Tier};
use super::particles::ParticleRequest;
use super::physics::{bodies_overlap, resolve_body_body};
use super::pickup::HeartPickup;
use super::player::{CollisionEvent, JumpKind, PlayerBody};
use super::projectile::Missile;
use super::random_span;
use super::state::{FireControl, GameEvent, GamePhase, GameState};
use crate::audio::SoundKind;

/// Directional sparks emitted when the player runs out of lives
const DEFEAT_BURST_RAYS: u32 = 30;

/// Enemy bumps slower than this stay quiet
const BUMP_FEEDBACK_MIN_SPEED: f32 = 0.5;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickInput {
    /// Horizontal intent in [-1, 1]
    pub move_x: f32,
    /// Jump pressed this tick
    pub jump: bool,
    /// Float held
    pub float: bool,
    /// Fire held
    pub fire: bool,
    /// Missile pitch: -1 up, 0 level, 1 down
    pub aim_y: f32,
    /// Pause toggle
    pub pause: bool,
    /// Idle/demo mode - autopilot plays the game
    pub idle_mode: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput) {
    state.audio_requests.clear();
    state.events.clear();

    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                log::debug!("Paused at tick {}", state.time_ticks);
                return;
            }
            GamePhase::Paused => state.phase = GamePhase::Playing,
            GamePhase::Defeated => {}
        }
    }

    match state.phase {
        GamePhase::Paused => return,
        GamePhase::Defeated => {
            state.defeat_ticks = state.defeat_ticks.saturating_add(1);
            state.particles.update();
            return;
        }
        GamePhase::Playing => {}
    }

    state.time_ticks += 1;

    let input = if input.idle_mode {
        autopilot(state)
    } else {
        *input
    };

    apply_input(state, &input);
    advance_fire_timers(state);
    update_obstacles(state);

    let contacts = update_player(state);
    if check_defeat(state) {
        return;
    }
    play_contacts(state, &contacts);

    update_missiles(state);
    resolve_missile_hits(state);
    update_door(state);
    spawn_enemies(state);
    update_enemies(state);
    update_bullets(state);
    cancel_projectiles(state);
    resolve_bullet_hits(state);
    update_hearts(state);
    resolve_enemy_collisions(state);
    resolve_player_enemies(state);
    check_door(state);

    state.particles.update();
}

fn apply_input(state: &mut GameState, input: &TickInput) {
    state.player.move_dir(input.move_x, &state.config.player);

    if input.float {
        state.player.start_floating();
    } else {
        state.player.stop_floating();
    }

    if input.jump {
        match state.player.jump(&state.config.player) {
            Some(JumpKind::Single) => state.play_sound(SoundKind::Jump, 1.0),
            Some(JumpKind::Double) => {
                state.play_sound(SoundKind::DoubleJump, 1.0);
                let pos = state.player.pos;
                let radius = state.player.half.x;
                state.emit(ParticleRequest::DoubleJumpRing { pos, radius });
            }
            None => {}
        }
    }

    handle_fire(state, input);
}

/// Tap or hold fires on a cooldown. Holding past the charge threshold with
/// enough rage switches to charging; releasing a full charge launches the
/// charged missile, releasing early discards it.
fn handle_fire(state: &mut GameState, input: &TickInput) {
    let charge_hold = state.config.weapons.charge_hold_ticks;
    let charge_time = state.config.weapons.charge_time;
    let cooldown = state.config.weapons.fire_cooldown;

    if !input.fire {
        if state.fire.charging && state.fire.charge_ticks >= charge_time {
            fire_charged_missile(state, input.aim_y);
        }
        state.fire = FireControl {
            cooldown: state.fire.cooldown,
            ..FireControl::default()
        };
        return;
    }

    state.fire.hold_ticks = state.fire.hold_ticks.saturating_add(1);
    if state.fire.charging {
        return;
    }

    let rage_ready = state.player.rage >= state.config.player.rage_super_cost;
    if state.fire.hold_ticks >= charge_hold && rage_ready {
        state.fire.charging = true;
        state.fire.charge_ticks = 0;
        state.fire.charge_grounded = state.player.grounded;
        log::debug!("Charging (grounded={})", state.player.grounded);
    } else if state.fire.cooldown == 0 {
        fire_missile(state, input.aim_y);
        state.fire.cooldown = cooldown;
    }
}

/// Missile launched from the player's leading edge
fn launch(player: &PlayerBody, size: Vec2, speed: f32, aim_y: f32, charged: bool) -> Missile {
    let facing = player.facing;
    let center = player.pos + Vec2::new((player.half.x + size.x * 0.5) * facing, 0.0);
    let aim = if aim_y.is_finite() { aim_y.clamp(-1.0, 1.0) } else { 0.0 };
    Missile::new(center, size, Vec2::new(facing, aim), speed, charged)
}

fn fire_missile(state: &mut GameState, aim_y: f32) {
    let weapons = &state.config.weapons;
    if !state.player.try_spend_energy(weapons.missile_energy_cost) {
        return;
    }
    let missile = launch(&state.player, weapons.missile_size, weapons.missile_speed, aim_y, false);
    state.missiles.push(missile);
}

fn fire_charged_missile(state: &mut GameState, aim_y: f32) {
    let rage_cost = state.config.player.rage_super_cost;
    let weapons = &state.config.weapons;
    if state.player.rage < rage_cost {
        return;
    }
    // A grounded charge already paid its energy while charging
    if !state.fire.charge_grounded && !state.player.try_spend_energy(weapons.charge_energy_cost) {
        return;
    }
    state.player.rage -= rage_cost;

    let missile = launch(
        &state.player,
        weapons.charged_missile_size,
        weapons.charged_missile_speed,
        aim_y,
        true,
    );
    state.missiles.push(missile);
    state.play_sound(SoundKind::Jump, 1.0);
    state.events.push(GameEvent::ChargedShotFired);
    log::debug!("Charged shot, rage left {:.0}", state.player.rage);
}

/// Step 1: fire cooldown and the grounded charge's energy drain
pub(crate) fn advance_fire_timers(state: &mut GameState) {
    state.fire.cooldown = state.fire.cooldown.saturating_sub(1);
    if !state.fire.charging {
        return;
    }

    state.fire.charge_ticks = state.fire.charge_ticks.saturating_add(1);
    let weapons = &state.config.weapons;
    if state.fire.charge_grounded && state.fire.charge_ticks <= weapons.charge_time {
        let per_tick = weapons.charge_energy_cost / weapons.charge_time.max(1) as f32;
        let left = state.player.drain_energy(per_tick);
        if left <= 0.0 && state.fire.charge_ticks < weapons.charge_time {
            log::debug!("Charge aborted: out of energy");
            state.fire.cancel_charge();
        }
    }
}

/// Step 2
pub(crate) fn update_obstacles(state: &mut GameState) {
    for obstacle in &mut state.obstacles {
        obstacle.update();
    }
}

/// Step 3
pub(crate) fn update_player(state: &mut GameState) -> Vec<CollisionEvent> {
    state.player.update(&state.config, &state.arena, &mut state.obstacles)
}

/// Enter the defeat phase once the last life is gone
pub(crate) fn check_defeat(state: &mut GameState) -> bool {
    if state.player.lives > 0 {
        return false;
    }

    state.phase = GamePhase::Defeated;
    state.defeat_ticks = 0;
    state.play_sound(SoundKind::LifeLost, 1.0);

    let pos = state.player.pos;
    for ray in 0..DEFEAT_BURST_RAYS {
        let dir = Vec2::from_angle(TAU * ray as f32 / DEFEAT_BURST_RAYS as f32);
        state.emit(ParticleRequest::Directional {
            pos,
            dir,
            intensity: 5.0,
        });
    }

    state.events.push(GameEvent::PlayerDefeated { level: state.level });
    log::info!(
        "Defeated on level {} after {} kills ({} ticks)",
        state.level,
        state.total_kills,
        state.time_ticks
    );
    true
}

/// Step 4: player contacts become dust and impact sounds
fn play_contacts(state: &mut GameState, contacts: &[CollisionEvent]) {
    for contact in contacts {
        state.emit(ParticleRequest::Directional {
            pos: contact.pos,
            dir: contact.normal,
            intensity: contact.intensity,
        });
        if let Some(kind) = contact.sound() {
            state.play_sound(kind, contact.intensity.min(1.0));
        }
    }
}

/// Step 5: move missiles, leave trails, stop them on solid obstacles
pub(crate) fn update_missiles(state: &mut GameState) {
    let trail_chance = state.config.weapons.trail_chance;

    for m in 0..state.missiles.len() {
        if state.particles.chance(trail_chance) {
            let pos = state.missiles[m].center();
            state.emit(ParticleRequest::MissileTrail { pos });
        }

        let missile = &mut state.missiles[m];
        missile.update(&state.arena);
        if !missile.active {
            continue;
        }

        let rect = missile.rect();
        let blocked = state
            .obstacles
            .iter()
            .any(|o| o.is_solid() && o.rect.overlaps(&rect));
        if !blocked {
            continue;
        }

        missile.active = false;
        if missile.charged {
            let pos = missile.center();
            state.emit(ParticleRequest::Explosion { pos, intensity: 2.0 });
            state.play_sound(SoundKind::BallCollision, 1.0);
        }
    }

    state.missiles.retain(|m| m.active);
}

fn kill_feedback(state: &mut GameState, pos: Vec2, tier: Tier) {
    state.emit(ParticleRequest::EnemyDestruction {
        pos,
        color: tier.color(),
    });
    state.play_sound(SoundKind::BallCollision, 0.8);
    state.events.push(GameEvent::EnemyKilled { tier, pos });
}

/// Steps 6 and 7: missiles against enemies, then removal of the dead.
///
/// A charged missile kills every enemy within the blast radius of its
/// centre on every tick it flies, touching or not. Direct contact also kills
/// the touched enemy and detonates the missile.
pub(crate) fn resolve_missile_hits(state: &mut GameState) {
    let rage_gain = state.config.player.rage_gain_per_hit;
    let mut killed = vec![false; state.enemies.len()];

    for m in 0..state.missiles.len() {
        let missile = state.missiles[m];
        if missile.charged {
            charged_blast(state, m, &mut killed);
            continue;
        }

        let target = (0..state.enemies.len()).find(|&i| {
            let enemy = &state.enemies[i];
            !killed[i] && missile.touches_body(enemy.pos, enemy.half)
        });
        let Some(index) = target else {
            continue;
        };
        state.missiles[m].active = false;

        state.player.add_rage(rage_gain, &state.config.player);
        let enemy = &mut state.enemies[index];
        let destroyed = enemy.take_damage(1);
        let (pos, tier, hp_left) = (enemy.pos, enemy.tier, enemy.hp);
        if destroyed {
            killed[index] = true;
            kill_feedback(state, pos, tier);
        } else {
            state.emit(ParticleRequest::Directional {
                pos,
                dir: Vec2::ZERO,
                intensity: 2.0,
            });
            state.play_sound(SoundKind::BallCollision, 0.4);
            state.events.push(GameEvent::EnemyDamaged { tier, hp_left });
        }
    }

    let removed = remove_marked(&mut state.enemies, &killed);
    record_kills(state, removed);
    state.missiles.retain(|m| m.active);
}

fn charged_blast(state: &mut GameState, m: usize, killed: &mut [bool]) {
    let missile = state.missiles[m];
    let blast = missile.center();
    let radius = state.config.weapons.explosion_radius;
    let touched = (0..state.enemies.len()).find(|&i| {
        let enemy = &state.enemies[i];
        missile.touches_body(enemy.pos, enemy.half)
    });

    for i in 0..state.enemies.len() {
        let (pos, tier) = (state.enemies[i].pos, state.enemies[i].tier);
        if killed[i] || (touched != Some(i) && pos.distance(blast) >= radius) {
            continue;
        }
        killed[i] = true;
        state.emit(ParticleRequest::EnemyDestruction {
            pos,
            color: tier.color(),
        });
        state.events.push(GameEvent::EnemyKilled { tier, pos });
    }

    if touched.is_some() {
        state.missiles[m].active = false;
        state.emit(ParticleRequest::Explosion {
            pos: blast,
            intensity: 3.0,
        });
        state.play_sound(SoundKind::BallCollision, 1.0);
    }
}

fn record_kills(state: &mut GameState, count: u32) {
    if count == 0 {
        return;
    }
    state.kills += count;
    state.total_kills += count;
    log::debug!("Kills this level: {}", state.kills);
}

/// Drop every item whose mark is set. Returns how many were dropped.
fn remove_marked<T>(items: &mut Vec<T>, marked: &[bool]) -> u32 {
    let before = items.len();
    let mut index = 0;
    items.retain(|_| {
        let keep = !marked.get(index).copied().unwrap_or(false);
        index += 1;
        keep
    });
    (before - items.len()) as u32
}

/// Step 8
pub(crate) fn update_door(state: &mut GameState) {
    if state.door.active || state.kills < state.config.enemies.kills_to_unlock_door {
        return;
    }
    state.door.active = true;
    state.events.push(GameEvent::DoorUnlocked);
    log::info!("Door unlocked on level {}", state.level);
}

/// Step 9: periodic spawns while below the population cap
pub(crate) fn spawn_enemies(state: &mut GameState) {
    if state.enemies.len() >= state.config.enemies.max_count {
        return;
    }
    state.spawn_timer += 1;
    if state.spawn_timer < state.config.enemies.spawn_interval {
        return;
    }
    state.spawn_timer = 0;

    let top = state.arena.inner_min().y;
    let enemy = Enemy::spawn(&mut state.rng, &state.config.enemies, &state.arena, top);
    log::debug!("Spawned {:?} at ({:.0}, {:.0})", enemy.tier, enemy.pos.x, enemy.pos.y);
    state.enemies.push(enemy);
}

/// Step 10: enemy AI, physics and shooting
pub(crate) fn update_enemies(state: &mut GameState) {
    for enemy in &mut state.enemies {
        enemy.update(&state.config, &state.arena, &state.obstacles, &mut state.rng);
        if let Some(pair) = enemy.tick_shooting(&mut state.rng, &state.config.enemies) {
            state.bullets.extend(pair);
        }
    }
}

/// Step 11
pub(crate) fn update_bullets(state: &mut GameState) {
    for bullet in &mut state.bullets {
        bullet.update(&state.arena);
    }
    state.bullets.retain(|b| b.active);
}

/// Step 12: a missile and a bullet that meet destroy each other
pub(crate) fn cancel_projectiles(state: &mut GameState) {
    let mut cancelled = vec![false; state.bullets.len()];

    for m in 0..state.missiles.len() {
        let center = state.missiles[m].center();
        let reach = state.missiles[m].size.max_element() * 0.5;
        let hit = (0..state.bullets.len()).find(|&j| {
            let bullet = &state.bullets[j];
            !cancelled[j] && center.distance(bullet.pos) < bullet.radius + reach
        });
        let Some(j) = hit else {
            continue;
        };

        state.missiles[m].active = false;
        cancelled[j] = true;
        let pos = state.bullets[j].pos;
        state.emit(ParticleRequest::Directional {
            pos,
            dir: Vec2::ZERO,
            intensity: 1.5,
        });
        state.play_sound(SoundKind::BallCollision, 0.3);
    }

    state.missiles.retain(|m| m.active);
    remove_marked(&mut state.bullets, &cancelled);
}

/// Lose a life with feedback. Returns false while invincible.
fn hurt_player(state: &mut GameState) -> bool {
    if !state.player.take_hit(&state.config.player) {
        return false;
    }
    state.play_sound(SoundKind::LifeLost, 0.8);
    let pos = state.player.pos;
    state.emit(ParticleRequest::Directional {
        pos,
        dir: Vec2::ZERO,
        intensity: 3.0,
    });
    state.events.push(GameEvent::PlayerHit {
        lives_left: state.player.lives,
    });
    log::debug!("Player hit, {} lives left", state.player.lives);
    true
}

/// Step 13: bullets touching the player are consumed even when the hit is
/// absorbed by invincibility
pub(crate) fn resolve_bullet_hits(state: &mut GameState) {
    let (center, half) = (state.player.pos, state.player.half);
    let touching: Vec<bool> = state
        .bullets
        .iter()
        .map(|b| b.touches_body(center, half))
        .collect();

    for _ in touching.iter().filter(|&&t| t) {
        hurt_player(state);
    }
    remove_marked(&mut state.bullets, &touching);
}

/// Step 14: heart spawning, falling and collection
pub(crate) fn update_hearts(state: &mut GameState) {
    if state.player.lives < state.player.max_lives {
        state.heart_timer += 1;
        if state.heart_timer >= state.config.pickups.heart_spawn_interval {
            state.heart_timer = 0;
            let wall = state.arena.wall;
            let x = random_span(&mut state.rng, wall + 50.0, state.arena.width - wall - 50.0);
            let pickups = &state.config.pickups;
            state.hearts.push(HeartPickup::new(
                Vec2::new(x, wall + 20.0),
                pickups.heart_size,
                pickups.heart_fall_speed,
            ));
        }
    }

    for heart in &mut state.hearts {
        heart.update(&state.arena);
    }

    let (center, half) = (state.player.pos, state.player.half);
    for h in 0..state.hearts.len() {
        let heart = state.hearts[h];
        if !heart.active || !heart.touches_body(center, half) {
            continue;
        }
        state.hearts[h].active = false;
        if state.player.restore_life() {
            state.play_sound(SoundKind::DoubleJump, 0.6);
            state.events.push(GameEvent::LifeRestored {
                lives: state.player.lives,
            });
        }
    }

    state.hearts.retain(|h| h.active);
}

/// Step 15: enemies push each other apart, pair by pair in list order
pub(crate) fn resolve_enemy_collisions(state: &mut GameState) {
    let restitution = state.config.physics.body_restitution;
    let count = state.enemies.len();

    for i in 0..count {
        for j in (i + 1)..count {
            let (head, tail) = state.enemies.split_at_mut(j);
            let (a, b) = (&mut head[i], &mut tail[0]);
            let contact = resolve_body_body(a.body(), b.body(), restitution);
            if !contact.collided {
                continue;
            }

            a.apply_body(&contact.a);
            b.apply_body(&contact.b);
            a.pos = state.arena.clamp_body(a.pos, a.half);
            b.pos = state.arena.clamp_body(b.pos, b.half);

            if contact.closing_speed > BUMP_FEEDBACK_MIN_SPEED {
                let pos = (a.pos + b.pos) * 0.5;
                let speed = (contact.a.vel - contact.b.vel).length();
                state.particles.emit(ParticleRequest::BodyCollision {
                    pos,
                    intensity: speed / 5.0,
                });
                state
                    .audio_requests
                    .push(crate::audio::AudioRequest::new(SoundKind::BallCollision, speed / 10.0));
            }
        }
    }
}

/// Steps 16 and 17: stomps and side hits, then removal of stomped enemies.
///
/// Classification uses the player's fall speed from before this step, so a
/// stomp earlier in the list does not turn later contacts into side hits.
pub(crate) fn resolve_player_enemies(state: &mut GameState) {
    let stomp_speed = state.config.enemies.stomp_fall_speed;
    let falling = state.player.vel.y;
    let mut stomped = vec![false; state.enemies.len()];

    for i in 0..state.enemies.len() {
        let (pos, half) = (state.enemies[i].pos, state.enemies[i].half);
        if !bodies_overlap(state.player.pos, state.player.half, pos, half) {
            continue;
        }

        if falling > stomp_speed && state.player.pos.y < pos.y {
            stomped[i] = stomp(state, i);
        } else {
            side_hit(state, i);
        }
    }

    let removed = remove_marked(&mut state.enemies, &stomped);
    record_kills(state, removed);
}

/// Landing on an enemy: one damage, a bounce, some rage. Only the player is
/// moved out of the overlap. Returns true when the enemy was destroyed.
fn stomp(state: &mut GameState, index: usize) -> bool {
    let contact = resolve_body_body(state.player.body(), state.enemies[index].body(), 0.0);
    let lift = (contact.a.pos - state.player.pos) * 2.0;
    state.player.pos = state.arena.clamp_body(state.player.pos + lift, state.player.half);
    state.player.vel.y = state.config.enemies.stomp_bounce;
    state
        .player
        .add_rage(state.config.player.rage_gain_per_hit, &state.config.player);

    let enemy = &mut state.enemies[index];
    let destroyed = enemy.take_damage(1);
    let (pos, tier, hp_left) = (enemy.pos, enemy.tier, enemy.hp);

    state.emit(ParticleRequest::Directional {
        pos,
        dir: Vec2::ZERO,
        intensity: 3.0,
    });
    state.play_sound(SoundKind::BallCollision, 0.6);
    if destroyed {
        kill_feedback(state, pos, tier);
    } else {
        state.events.push(GameEvent::EnemyDamaged { tier, hp_left });
    }
    destroyed
}

/// Any other contact costs a life (unless rage-boosted) and bounces both
/// bodies apart
fn side_hit(state: &mut GameState, index: usize) {
    if !state.player.is_rage_boosted(&state.config.player) {
        hurt_player(state);
    }

    let restitution = state.config.physics.body_restitution;
    let contact = resolve_body_body(state.player.body(), state.enemies[index].body(), restitution);
    if !contact.collided {
        return;
    }

    state.player.apply_body(&contact.a);
    state.player.pos = state.arena.clamp_body(state.player.pos, state.player.half);
    let enemy = &mut state.enemies[index];
    enemy.apply_body(&contact.b);
    enemy.pos = state.arena.clamp_body(enemy.pos, enemy.half);

    let pos = (state.player.pos + state.enemies[index].pos) * 0.5;
    let speed = (contact.a.vel - contact.b.vel).length();
    state.emit(ParticleRequest::BodyCollision {
        pos,
        intensity: speed / 4.0,
    });
}

/// Step 18: touching the open door completes the level
pub(crate) fn check_door(state: &mut GameState) {
    if !state.door.touches_body(state.player.pos, state.player.half) {
        return;
    }

    let completed = state.level;
    state.level += 1;
    log::info!(
        "Level {} complete ({} kills total), entering level {}",
        completed,
        state.total_kills,
        state.level
    );
    state.load_level();
    state.events.push(GameEvent::LevelCompleted { level: completed });
    state.play_sound(SoundKind::DoubleJump, 1.0);
}

/// Demo player. Heads for the door once it opens, otherwise keeps a firing
/// distance from the nearest enemy, hops periodically and spends rage on
/// charged shots. Reads state only, so replays stay deterministic.
pub fn autopilot(state: &GameState) -> TickInput {
    let mut input = TickInput::default();
    if state.phase != GamePhase::Playing {
        return input;
    }

    let player = &state.player;
    let nearest = state.enemies.iter().min_by(|a, b| {
        a.pos
            .distance_squared(player.pos)
            .total_cmp(&b.pos.distance_squared(player.pos))
    });
    let target = if state.door.active {
        Some(state.door.rect.center())
    } else {
        nearest.map(|e| e.pos)
    };
    let Some(target) = target else {
        return input;
    };

    let delta = target - player.pos;
    let standoff = if state.door.active { 0.0 } else { 150.0 };
    if delta.x.abs() > standoff + 20.0 {
        input.move_x = delta.x.signum();
    } else if delta.x.abs() < standoff - 60.0 {
        input.move_x = -delta.x.signum();
    }

    if player.grounded && (delta.y < -120.0 || state.time_ticks % 97 == 0) {
        input.jump = true;
    } else if !player.grounded && player.vel.y > 1.0 && delta.y < -60.0 && player.energy > 60.0 {
        input.jump = true;
    }
    input.float = !player.grounded && player.vel.y > 4.0 && player.energy > 50.0;

    if !state.door.active {
        input.aim_y = if delta.y < -100.0 {
            -1.0
        } else if delta.y > 100.0 {
            1.0
        } else {
            0.0
        };
        let facing_target = player.facing * delta.x >= 0.0 && input.move_x * delta.x >= 0.0;
        input.fire = autopilot_trigger(state, facing_target);
    }

    input
}

fn autopilot_trigger(state: &GameState, want: bool) -> bool {
    if state.fire.charging {
        return state.fire.charge_ticks < state.config.weapons.charge_time;
    }
    if !want {
        return false;
    }
    state.player.rage >= state.config.player.rage_super_cost || state.time_ticks % 20 < 12
}
