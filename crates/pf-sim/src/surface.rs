//! Cell boundary variants and the crossing state machine.

use crate::phonon::Phonon;
use pf_core::CellId;

/// Which boundary of a cell a surface sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceLocation {
    Left,
    Right,
}

/// Closed set of boundary kinds in the 1-D chain.
#[derive(Clone, Copy, Debug)]
pub enum Surface {
    /// Boundary held at a fixed external temperature. Absorbs arriving
    /// phonons and is the source of boundary emission.
    Emit { temp_k: f64 },
    /// Internal boundary transporting phonons into the adjacent cell.
    Transition { neighbor: CellId },
}

/// Outcome of a phonon reaching a surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Crossing {
    /// Terminal: the phonon left the simulation.
    Absorbed,
    /// The phonon continues drifting in the neighbor cell.
    Transmitted { to: CellId },
    /// Reserved for future surface kinds; not produced by Emit/Transition.
    Reflected,
}

impl Surface {
    /// Resolve a crossing for a phonon that reached this surface.
    pub fn on_phonon_arrival(&self, phonon: &mut Phonon) -> Crossing {
        match self {
            Surface::Emit { .. } => {
                phonon.deactivate();
                Crossing::Absorbed
            }
            Surface::Transition { neighbor } => Crossing::Transmitted { to: *neighbor },
        }
    }
}
