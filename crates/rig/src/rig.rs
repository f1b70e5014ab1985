use glam::{Mat4, Quat, Vec3};
use peerspace_common::Pose;
use peerspace_input::{Key, PointerLock};
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;

/// Tunables for the first-person controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigConfig {
    /// Radians of rotation per pixel of mouse movement.
    pub sensitivity: f32,
    /// Movement speed in world units per second.
    pub move_speed: f32,
    /// Height of the head (pitch carrier) above the rig origin.
    pub eye_height: f32,
    /// Pitch is clamped to `[-pitch_limit, pitch_limit]`. Values outside
    /// `[0, π/2]` are pinned to that range.
    pub pitch_limit: f32,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            sensitivity: 0.002,
            move_speed: 100.0,
            eye_height: 10.0,
            pitch_limit: FRAC_PI_2,
        }
    }
}

impl RigConfig {
    /// `pitch_limit` pinned to `[0, π/2]`; NaN counts as zero.
    pub fn effective_pitch_limit(&self) -> f32 {
        self.pitch_limit.max(0.0).min(FRAC_PI_2)
    }
}

/// Directional intents set by the movement keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveIntents {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl MoveIntents {
    /// Unit-length movement direction in rig space (x right, z backward),
    /// or zero when the intents cancel out.
    pub fn direction(&self) -> Vec3 {
        let x = f32::from(u8::from(self.right)) - f32::from(u8::from(self.left));
        let z = f32::from(u8::from(self.backward)) - f32::from(u8::from(self.forward));
        Vec3::new(x, 0.0, z).normalize_or_zero()
    }

    fn longitudinal(&self) -> bool {
        self.forward || self.backward
    }

    fn lateral(&self) -> bool {
        self.left || self.right
    }
}

/// First-person camera rig.
///
/// Camera motion is local to this client; remote peers only ever see the
/// published [`Pose`] of the yaw carrier.
#[derive(Debug, Clone)]
pub struct CameraRig {
    config: RigConfig,
    position: Vec3,
    yaw: f32,
    pitch: f32,
    intents: MoveIntents,
    pointer: PointerLock,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new(RigConfig::default())
    }
}

impl CameraRig {
    pub fn new(config: RigConfig) -> Self {
        Self {
            config,
            position: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            intents: MoveIntents::default(),
            pointer: PointerLock::new(),
        }
    }

    pub fn config(&self) -> &RigConfig {
        &self.config
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Position of the yaw carrier (the rig origin, on the floor).
    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn intents(&self) -> MoveIntents {
        self.intents
    }

    pub fn pointer(&self) -> &PointerLock {
        &self.pointer
    }

    pub fn is_locked(&self) -> bool {
        self.pointer.is_locked()
    }

    pub fn on_pointer_lock_change(&mut self, locked: bool) {
        self.pointer.on_change(locked);
    }

    pub fn on_pointer_lock_error(&mut self, reason: impl Into<String>) {
        self.pointer.on_error(reason);
    }

    /// Apply a mouse delta. Ignored unless the pointer is locked.
    /// Returns true if the orientation was updated.
    pub fn on_look_delta(&mut self, dx: f32, dy: f32) -> bool {
        if !self.pointer.is_locked() {
            return false;
        }
        self.yaw -= dx * self.config.sensitivity;
        self.pitch -= dy * self.config.sensitivity;
        let limit = self.config.effective_pitch_limit();
        self.pitch = self.pitch.clamp(-limit, limit);
        true
    }

    /// Track a movement key. Non-movement keys are ignored.
    pub fn on_key_change(&mut self, key: Key, pressed: bool) {
        let flag = match key {
            Key::W => &mut self.intents.forward,
            Key::A => &mut self.intents.left,
            Key::S => &mut self.intents.backward,
            Key::D => &mut self.intents.right,
            Key::Other(_) => return,
        };
        *flag = pressed;
    }

    /// Advance the rig by `dt` seconds. Returns the world-space translation
    /// that was applied.
    pub fn integrate(&mut self, dt: f32) -> Vec3 {
        let direction = self.intents.direction();
        let step = self.config.move_speed * dt;
        let heading = self.heading();

        let mut translation = Vec3::ZERO;
        if self.intents.longitudinal() {
            translation += heading * Vec3::Z * (direction.z * step);
        }
        if self.intents.lateral() {
            translation += heading * Vec3::X * (direction.x * step);
        }
        self.position += translation;
        translation
    }

    /// Rotation of the yaw carrier.
    pub fn heading(&self) -> Quat {
        Quat::from_rotation_y(self.yaw)
    }

    /// Full camera orientation: yaw, then pitch.
    pub fn orientation(&self) -> Quat {
        self.heading() * Quat::from_rotation_x(self.pitch)
    }

    pub fn eye_position(&self) -> Vec3 {
        self.position + Vec3::Y * self.config.eye_height
    }

    /// Direction the camera looks at (camera space -Z).
    pub fn forward(&self) -> Vec3 {
        self.orientation() * Vec3::NEG_Z
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation(), self.eye_position()).inverse()
    }

    /// Euler rotation of the yaw carrier. Pitch stays local to the head.
    pub fn yaw_rotation(&self) -> Vec3 {
        Vec3::new(0.0, self.yaw, 0.0)
    }

    /// Body pose as published to other peers.
    pub fn pose(&self) -> Pose {
        Pose::new(self.position, self.yaw_rotation())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locked_rig() -> CameraRig {
        let mut rig = CameraRig::default();
        rig.on_pointer_lock_change(true);
        rig
    }

    fn press(rig: &mut CameraRig, keys: &[Key]) {
        for k in keys {
            rig.on_key_change(*k, true);
        }
    }

    #[test]
    fn starts_at_identity() {
        let rig = CameraRig::default();
        assert_eq!(rig.yaw(), 0.0);
        assert_eq!(rig.pitch(), 0.0);
        assert_eq!(rig.position(), Vec3::ZERO);
        assert_eq!(rig.eye_position(), Vec3::new(0.0, 10.0, 0.0));
        assert!(!rig.is_locked());
    }

    #[test]
    fn look_while_unlocked_is_ignored() {
        let mut rig = CameraRig::default();
        assert!(!rig.on_look_delta(100.0, 50.0));
        assert_eq!(rig.yaw(), 0.0);
        assert_eq!(rig.pitch(), 0.0);
    }

    #[test]
    fn look_applies_sensitivity() {
        let mut rig = locked_rig();
        assert!(rig.on_look_delta(10.0, 5.0));
        assert!((rig.yaw() - -0.02).abs() < 1e-6);
        assert!((rig.pitch() - -0.01).abs() < 1e-6);
    }

    #[test]
    fn pitch_stays_within_clamp() {
        let mut rig = locked_rig();
        let deltas = [5000.0, -12000.0, 300.0, -1.0, 9000.0, -9000.0, 0.5];
        for dy in deltas {
            rig.on_look_delta(0.0, dy);
            assert!(rig.pitch() >= -FRAC_PI_2 && rig.pitch() <= FRAC_PI_2);
        }
        rig.on_look_delta(0.0, -1.0e6);
        assert_eq!(rig.pitch(), FRAC_PI_2);
    }

    #[test]
    fn oversized_pitch_limit_still_stops_at_vertical() {
        let mut rig = CameraRig::new(RigConfig {
            pitch_limit: 3.0,
            ..RigConfig::default()
        });
        rig.on_pointer_lock_change(true);
        rig.on_look_delta(0.0, -1.0e6);
        assert_eq!(rig.pitch(), FRAC_PI_2);
    }

    #[test]
    fn negative_or_nan_pitch_limit_pins_pitch_level() {
        for pitch_limit in [-1.0, f32::NAN] {
            let mut rig = CameraRig::new(RigConfig {
                pitch_limit,
                ..RigConfig::default()
            });
            rig.on_pointer_lock_change(true);
            assert!(rig.on_look_delta(1.0, 1.0));
            assert_eq!(rig.pitch(), 0.0);
            assert!((rig.yaw() - -0.002).abs() < 1e-6);
        }
    }

    #[test]
    fn yaw_is_unbounded() {
        let mut rig = locked_rig();
        for _ in 0..10 {
            rig.on_look_delta(-1000.0, 0.0);
        }
        assert!((rig.yaw() - 20.0).abs() < 1e-3);
    }

    #[test]
    fn keys_track_regardless_of_lock() {
        let mut rig = CameraRig::default();
        rig.on_key_change(Key::W, true);
        rig.on_key_change(Key::W, true);
        assert!(rig.intents().forward);
        rig.on_key_change(Key::Other(32), true);
        rig.on_key_change(Key::W, false);
        assert_eq!(rig.intents(), MoveIntents::default());
    }

    #[test]
    fn diagonal_movement_is_normalized() {
        let mut rig = CameraRig::default();
        press(&mut rig, &[Key::W, Key::D]);
        let t = 0.5;
        let moved = rig.integrate(t);
        let expected = Vec3::new(1.0, 0.0, -1.0).normalize() * 100.0 * t;
        assert!(moved.abs_diff_eq(expected, 1e-4));
        assert!(rig.position().abs_diff_eq(expected, 1e-4));
    }

    #[test]
    fn opposite_keys_cancel() {
        let mut rig = CameraRig::default();
        press(&mut rig, &[Key::W, Key::S]);
        for dt in [0.0, 0.016, 1.0, 10.0] {
            assert_eq!(rig.integrate(dt), Vec3::ZERO);
        }

        rig.on_key_change(Key::D, true);
        let moved = rig.integrate(1.0);
        assert!(moved.abs_diff_eq(Vec3::new(100.0, 0.0, 0.0), 1e-4));
    }

    #[test]
    fn releasing_one_opposing_key_keeps_the_other() {
        let mut rig = CameraRig::default();
        press(&mut rig, &[Key::W, Key::S]);
        rig.on_key_change(Key::S, false);
        let moved = rig.integrate(0.1);
        assert!(moved.abs_diff_eq(Vec3::new(0.0, 0.0, -10.0), 1e-4));
    }

    #[test]
    fn movement_follows_yaw_not_pitch() {
        let mut rig = locked_rig();
        // Quarter turn to the left, then look straight up.
        let quarter = -FRAC_PI_2 / rig.config().sensitivity;
        rig.on_look_delta(quarter, -1.0e6);
        rig.on_key_change(Key::W, true);
        let moved = rig.integrate(1.0);
        assert!(moved.abs_diff_eq(Vec3::new(-100.0, 0.0, 0.0), 1e-2));
        assert!(moved.y.abs() < 1e-6);
    }

    #[test]
    fn pose_carries_yaw_only() {
        let mut rig = locked_rig();
        rig.on_look_delta(-100.0, 40.0);
        let pose = rig.pose();
        assert_eq!(pose.rotation.x, 0.0);
        assert_eq!(pose.rotation.z, 0.0);
        assert!((pose.rotation.y - 0.2).abs() < 1e-6);
    }

    #[test]
    fn capture_error_unlocks() {
        let mut rig = locked_rig();
        rig.on_pointer_lock_error("lost");
        assert!(!rig.on_look_delta(10.0, 10.0));
    }

    #[test]
    fn view_matrix_is_finite() {
        let mut rig = locked_rig();
        rig.on_look_delta(123.0, -45.0);
        let v = rig.view_matrix();
        assert!(v.is_finite());
        let eye_in_view = v.transform_point3(rig.eye_position());
        assert!(eye_in_view.abs_diff_eq(Vec3::ZERO, 1e-4));
    }
}
