use glam::{Mat4, Vec3};
use peerspace_common::{PeerId, Pose};
use peerspace_rig::{CameraRig, Projection};

use crate::scene::SceneDescription;

/// A remote peer as it should appear this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PeerView {
    pub id: PeerId,
    pub pose: Pose,
}

/// Read-only snapshot of everything that changes per frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameView {
    pub frame: u64,
    pub eye: Vec3,
    pub forward: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub pointer_locked: bool,
    pub view: Mat4,
    pub projection: Projection,
    pub peers: Vec<PeerView>,
}

impl FrameView {
    pub fn capture(frame: u64, rig: &CameraRig, projection: &Projection, peers: Vec<PeerView>) -> Self {
        Self {
            frame,
            eye: rig.eye_position(),
            forward: rig.forward(),
            yaw: rig.yaw(),
            pitch: rig.pitch(),
            pointer_locked: rig.is_locked(),
            view: rig.view_matrix(),
            projection: *projection,
            peers,
        }
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection.view_projection(self.view)
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads the static scene and the frame view, then produces
/// output. It never mutates session state.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame.
    fn render(&self, scene: &SceneDescription, view: &FrameView) -> Self::Output;
}

/// Text renderer used by the CLI and in tests.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &SceneDescription, view: &FrameView) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "=== Frame {} (skybox={:.0}, floor={:.0}x{:.0}) ===\n",
            view.frame, scene.skybox.size, scene.floor.width, scene.floor.depth
        ));
        out.push_str(&format!(
            "Camera: eye=({:.2}, {:.2}, {:.2}) yaw={:.3} pitch={:.3} aspect={:.3} {}\n",
            view.eye.x,
            view.eye.y,
            view.eye.z,
            view.yaw,
            view.pitch,
            view.projection.aspect,
            if view.pointer_locked {
                "[locked]"
            } else {
                "[unlocked]"
            }
        ));
        out.push_str(&format!("Peers: {}\n", view.peers.len()));

        for peer in &view.peers {
            let p = peer.pose.position;
            out.push_str(&format!(
                "  [{}] pos=({:.2}, {:.2}, {:.2}) yaw={:.3}\n",
                peer.id, p.x, p.y, p.z, peer.pose.rotation.y
            ));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view_with(peers: Vec<PeerView>) -> FrameView {
        FrameView::capture(3, &CameraRig::default(), &Projection::default(), peers)
    }

    #[test]
    fn debug_renderer_no_peers() {
        let out = DebugTextRenderer::new().render(&SceneDescription::default(), &view_with(vec![]));
        assert!(out.contains("Frame 3"));
        assert!(out.contains("Peers: 0"));
        assert!(out.contains("eye=(0.00, 10.00, 0.00)"));
        assert!(out.contains("[unlocked]"));
    }

    #[test]
    fn debug_renderer_lists_peers() {
        let peers = vec![PeerView {
            id: PeerId::new("abc"),
            pose: Pose::new(Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO),
        }];
        let out = DebugTextRenderer::new().render(&SceneDescription::default(), &view_with(peers));
        assert!(out.contains("Peers: 1"));
        assert!(out.contains("[abc] pos=(1.00, 2.00, 3.00)"));
    }

    #[test]
    fn capture_reads_rig() {
        let view = view_with(vec![]);
        assert!(view.forward.abs_diff_eq(Vec3::NEG_Z, 1e-6));
        assert!(view.view_projection().is_finite());
    }
}
