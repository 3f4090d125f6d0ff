//! Simulation tick
//!
//! Advances one attempt by one step. The tick owns no state of its own: it
//! mutates the [`SimState`] it is given, reads the level, and reports what
//! happened as a list of [`GameEvent`]s.

use super::behavior::{Effect, overlapping, resolve, touching_ready_orb};
use super::floor::{Floor, resolve_floor};
use super::input::TickInput;
use super::obstacle::TriggerState;
use super::state::{Actor, DeathCause, GameEvent, Gravity, MovementMode, SimState, progress_score};
use crate::consts::{TAKEOFF_NUDGE, TICK_MS, WAVE_TILT};
use crate::level::Level;
use crate::tuning::Tuning;

/// How a step ended the life
enum Ending {
    Died(DeathCause),
    Won,
}

/// Advance the simulation by `input.dt` logical ticks.
///
/// A finished life (dead or won) is left untouched. If the tick uses the
/// queued jump edge, or the actor is in Wave mode, `input.jump_queued` is
/// cleared.
pub fn tick(state: &mut SimState, level: &Level, input: &mut TickInput) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if !state.actor.is_running() {
        return events;
    }

    state.time_ticks += 1;

    let SimState {
        actor,
        triggers,
        tuning,
        ..
    } = &mut *state;
    let ending = step(actor, triggers, tuning, level, input, &mut events);
    events.extend(match ending {
        Some(Ending::Died(cause)) => state.kill(cause),
        Some(Ending::Won) => state.win(),
        None => None,
    });

    let score = progress_score(state.actor.pos.x, level.length);
    if score != state.score {
        state.score = score;
        events.push(GameEvent::Progress { score });
    }

    events
}

fn step(
    actor: &mut Actor,
    triggers: &mut [TriggerState],
    tuning: &Tuning,
    level: &Level,
    input: &mut TickInput,
    events: &mut Vec<GameEvent>,
) -> Option<Ending> {
    let dt = input.dt;

    // Refractory windows run on simulated time only
    let elapsed_ms = dt * TICK_MS;
    for trigger in triggers.iter_mut() {
        trigger.advance(elapsed_ms, tuning.trigger_cooldown_ms);
    }

    // Horizontal motion is the same in every mode
    actor.pos.x += tuning.base_speed * actor.speed_multiplier * dt;

    let floor = resolve_floor(level, actor, tuning);

    integrate_vertical(actor, input, tuning);
    land_or_fly(actor, floor, tuning, dt);

    if actor.mode == MovementMode::Cube {
        let orb_ready = touching_ready_orb(level, actor, triggers, tuning);
        try_jump(actor, input, orb_ready, tuning, events);
    }

    // Field boundaries
    if actor.pos.y <= 0.0 {
        return Some(Ending::Died(DeathCause::Ceiling));
    }
    if actor.mode == MovementMode::Wave && actor.pos.y < tuning.wave_ceiling() {
        return Some(Ending::Died(DeathCause::WaveCeiling));
    }

    if let Some(cause) = collide(actor, triggers, level, input, tuning, events) {
        return Some(Ending::Died(cause));
    }

    // Wave presses only steer; an unused edge must not outlive the wave
    if actor.mode == MovementMode::Wave {
        input.take_queued();
    }

    if actor.pos.x > level.length {
        return Some(Ending::Won);
    }

    let fell = match actor.gravity {
        Gravity::Normal => actor.pos.y > tuning.field_height + tuning.fall_margin,
        Gravity::Inverted => actor.pos.y + tuning.player_size < -tuning.fall_margin,
    };
    fell.then_some(Ending::Died(DeathCause::Fell))
}

/// Gravity integration (cube) or direct velocity control (wave)
fn integrate_vertical(actor: &mut Actor, input: &TickInput, tuning: &Tuning) {
    let dt = input.dt;
    let sign = actor.gravity.sign();

    match actor.mode {
        MovementMode::Cube => {
            actor.dy += tuning.gravity * sign * dt;
        }
        MovementMode::Wave => {
            // Holding climbs against gravity, releasing dives with it
            let direction = if input.jump_held { -sign } else { sign };
            let target = tuning.wave_max_speed * direction;
            let blend = (tuning.wave_smoothing * dt).min(1.0);
            actor.dy += (target - actor.dy) * blend;
        }
    }
    actor.pos.y += actor.dy * dt;
}

/// Clamp onto the floor if it was reached, otherwise keep flying
fn land_or_fly(actor: &mut Actor, floor: Option<Floor>, tuning: &Tuning, dt: f32) {
    let landed = floor.filter(|floor| floor.reached(actor.pos.y, actor.gravity));

    if let Some(floor) = landed {
        actor.pos.y = floor.y;
        actor.dy = 0.0;
        actor.grounded = true;
        actor.jumps_available = tuning.max_jumps;
        actor.rotation = match actor.mode {
            MovementMode::Cube => settle_rotation(actor.rotation, dt),
            MovementMode::Wave => 0.0,
        };
    } else {
        actor.grounded = false;
        actor.rotation = match actor.mode {
            MovementMode::Cube => {
                (actor.rotation + tuning.air_spin * actor.gravity.sign() * dt).rem_euclid(360.0)
            }
            MovementMode::Wave => wave_tilt(actor.dy),
        };
    }
}

/// Ease a grounded cube toward the nearest right angle
fn settle_rotation(rotation: f32, dt: f32) -> f32 {
    let snap = (rotation / 90.0).round() * 90.0;
    let rotation = if (snap - rotation).abs() > 1.0 {
        rotation + (snap - rotation) * (0.2 * dt).min(1.0)
    } else {
        snap
    };
    rotation.rem_euclid(360.0)
}

/// Wave points along its direction of vertical travel
fn wave_tilt(dy: f32) -> f32 {
    if dy < 0.0 {
        -WAVE_TILT
    } else if dy > 0.0 {
        WAVE_TILT
    } else {
        0.0
    }
}

/// Ground jumps accept a held button; air jumps need a fresh press and yield
/// to a ready orb so the press can fire it instead.
fn try_jump(
    actor: &mut Actor,
    input: &mut TickInput,
    orb_ready: bool,
    tuning: &Tuning,
    events: &mut Vec<GameEvent>,
) {
    if actor.jumps_available == 0 {
        return;
    }

    let ground_jump = actor.grounded && (input.jump_held || input.jump_queued);
    let air_jump = !actor.grounded && input.jump_queued && !orb_ready;
    if !(ground_jump || air_jump) {
        return;
    }

    let sign = actor.gravity.sign();
    actor.dy = -tuning.jump_impulse * sign;
    actor.pos.y -= TAKEOFF_NUDGE * sign;
    actor.jumps_available -= 1;
    actor.grounded = false;
    input.take_queued();

    events.push(GameEvent::Jumped {
        airborne: air_jump,
    });
}

/// Apply every overlapped obstacle in id order. Returns the cause if one was lethal.
fn collide(
    actor: &mut Actor,
    triggers: &mut [TriggerState],
    level: &Level,
    input: &mut TickInput,
    tuning: &Tuning,
    events: &mut Vec<GameEvent>,
) -> Option<DeathCause> {
    let hits: Vec<_> = overlapping(level, actor, tuning).collect();

    for (index, obstacle, bounds) in hits {
        let effect = resolve(
            obstacle,
            &bounds,
            actor,
            triggers[index],
            input.jump_queued,
            tuning,
        );

        if effect.is_one_shot() && !triggers[index].fire() {
            continue;
        }

        match effect {
            Effect::None | Effect::Rest => {}

            Effect::Lethal => {
                return Some(DeathCause::Obstacle {
                    id: obstacle.id,
                    kind: obstacle.kind,
                });
            }

            Effect::Launch { dy } => {
                actor.dy = dy;
                actor.grounded = false;
                if obstacle.kind.is_input_gated() {
                    input.take_queued();
                }
                log::debug!("{:?} {} launched actor (dy={})", obstacle.kind, obstacle.id, dy);
                events.push(GameEvent::TriggerFired {
                    obstacle_id: obstacle.id,
                    kind: obstacle.kind,
                });
            }

            Effect::FlipGravity => {
                actor.gravity = actor.gravity.flipped();
                actor.dy = 0.0;
                actor.grounded = false;
                input.take_queued();
                log::debug!("Gravity orb {} flipped gravity", obstacle.id);
                events.push(GameEvent::TriggerFired {
                    obstacle_id: obstacle.id,
                    kind: obstacle.kind,
                });
                events.push(GameEvent::GravityChanged {
                    gravity: actor.gravity,
                });
            }

            Effect::SetGravity(gravity) => {
                if actor.gravity != gravity {
                    actor.gravity = gravity;
                    actor.dy = 0.0;
                    actor.grounded = false;
                    events.push(GameEvent::GravityChanged { gravity });
                }
            }

            Effect::SetSpeed(multiplier) => {
                if actor.speed_multiplier != multiplier {
                    actor.speed_multiplier = multiplier;
                    events.push(GameEvent::SpeedChanged { multiplier });
                }
            }

            Effect::SetMode(mode) => {
                if actor.mode != mode {
                    actor.mode = mode;
                    actor.rotation = 0.0;
                    // A press from the previous mode does not carry over
                    input.take_queued();
                    events.push(GameEvent::ModeChanged { mode });
                }
            }
        }
    }

    None
}
