// renderer/input.rs
// Key handling as data: one table from input symbol to effect, one pure
// function applying the effect to the view state. Each effect is testable
// without any input device.

use super::state::RenderState;

/// Effect of one key press. Toggles flip exactly one field; the rest are
/// one-shot actions the loop carries out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    TogglePauseSim,
    TogglePauseRender,
    ToggleSpheres,
    ToggleTree,
    ToggleMass,
    ToggleWire,
    ToggleClear,
    ToggleGhosts,
    NextReference,
    PrevReference,
    ResetView,
    Capture,
}

/// What the loop still has to do after the state mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    Handled,
    Quit,
    Capture,
}

/// Key-to-effect mapping. Letter keys act on either case except the
/// reference pair, which steps in opposite directions.
pub const KEYMAP: &[(char, KeyAction)] = &[
    ('q', KeyAction::Quit),
    ('Q', KeyAction::Quit),
    (' ', KeyAction::TogglePauseSim),
    ('s', KeyAction::ToggleSpheres),
    ('S', KeyAction::ToggleSpheres),
    ('g', KeyAction::ToggleGhosts),
    ('G', KeyAction::ToggleGhosts),
    ('r', KeyAction::ResetView),
    ('R', KeyAction::ResetView),
    ('t', KeyAction::ToggleTree),
    ('T', KeyAction::ToggleTree),
    ('d', KeyAction::TogglePauseRender),
    ('D', KeyAction::TogglePauseRender),
    ('m', KeyAction::ToggleMass),
    ('M', KeyAction::ToggleMass),
    ('w', KeyAction::ToggleWire),
    ('W', KeyAction::ToggleWire),
    ('c', KeyAction::ToggleClear),
    ('C', KeyAction::ToggleClear),
    ('x', KeyAction::NextReference),
    ('X', KeyAction::PrevReference),
    ('p', KeyAction::Capture),
    ('P', KeyAction::Capture),
];

pub fn lookup(key: char) -> Option<KeyAction> {
    KEYMAP.iter().find(|(c, _)| *c == key).map(|&(_, a)| a)
}

/// Apply one action to the state. `n` is the current particle count for
/// reference cycling.
pub fn apply_key(state: &mut RenderState, action: KeyAction, n: usize) -> KeyOutcome {
    match action {
        KeyAction::Quit => return KeyOutcome::Quit,
        KeyAction::Capture => return KeyOutcome::Capture,
        KeyAction::TogglePauseSim => {
            state.pause_sim = !state.pause_sim;
            log::info!("{}", if state.pause_sim { "pause" } else { "resume" });
        }
        KeyAction::TogglePauseRender => state.pause_render = !state.pause_render,
        KeyAction::ToggleSpheres => state.spheres = !state.spheres,
        KeyAction::ToggleTree => {
            // showing the tree always starts without mass markers
            state.mass = false;
            state.tree = !state.tree;
        }
        KeyAction::ToggleMass => state.mass = !state.mass,
        KeyAction::ToggleWire => state.wire = !state.wire,
        KeyAction::ToggleClear => state.clear = !state.clear,
        KeyAction::ToggleGhosts => state.ghosts = !state.ghosts,
        KeyAction::NextReference => {
            state.cycle_reference(1, n);
            log::info!("reference particle: {}", state.reference);
        }
        KeyAction::PrevReference => {
            state.cycle_reference(-1, n);
            log::info!("reference particle: {}", state.reference);
        }
        KeyAction::ResetView => {
            state.rotate_x = 0.0;
            state.rotate_z = 0.0;
        }
    }
    KeyOutcome::Handled
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_toggle_flips_exactly_one_field() {
        let baseline = RenderState::default();
        let toggles = [
            KeyAction::TogglePauseSim,
            KeyAction::TogglePauseRender,
            KeyAction::ToggleSpheres,
            KeyAction::ToggleMass,
            KeyAction::ToggleWire,
            KeyAction::ToggleClear,
            KeyAction::ToggleGhosts,
        ];
        for action in toggles {
            let mut s = baseline.clone();
            assert_eq!(apply_key(&mut s, action, 8), KeyOutcome::Handled);
            assert_ne!(s, baseline, "{action:?} should change the state");
            apply_key(&mut s, action, 8);
            assert_eq!(s, baseline, "{action:?} should be an involution");
        }
    }

    #[test]
    fn tree_toggle_clears_mass_markers() {
        let mut s = RenderState::default();
        s.mass = true;
        apply_key(&mut s, KeyAction::ToggleTree, 8);
        assert!(s.tree);
        assert!(!s.mass);
    }

    #[test]
    fn quit_and_capture_are_one_shot_outcomes() {
        let mut s = RenderState::default();
        assert_eq!(apply_key(&mut s, KeyAction::Quit, 8), KeyOutcome::Quit);
        assert_eq!(apply_key(&mut s, KeyAction::Capture, 8), KeyOutcome::Capture);
        assert_eq!(s, RenderState::default());
    }

    #[test]
    fn reset_view_zeroes_camera_angles() {
        let mut s = RenderState::default();
        s.rotate_x = 30.0;
        s.rotate_z = -45.0;
        apply_key(&mut s, KeyAction::ResetView, 8);
        assert_eq!(s.rotate_x, 0.0);
        assert_eq!(s.rotate_z, 0.0);
    }

    #[test]
    fn keymap_covers_the_classic_bindings() {
        assert_eq!(lookup(' '), Some(KeyAction::TogglePauseSim));
        assert_eq!(lookup('x'), Some(KeyAction::NextReference));
        assert_eq!(lookup('X'), Some(KeyAction::PrevReference));
        assert_eq!(lookup('q'), Some(KeyAction::Quit));
        assert_eq!(lookup('?'), None);
        // both cases map identically for the plain toggles
        for (lower, upper) in [('s', 'S'), ('t', 'T'), ('w', 'W'), ('c', 'C')] {
            assert_eq!(lookup(lower), lookup(upper));
        }
    }
}
