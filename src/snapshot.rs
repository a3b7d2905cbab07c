// snapshot.rs
// Binary state snapshot: a fixed-layout scalar header followed by exactly N
// particle records. No magic number, no version field, no checksum; a
// snapshot is only readable by a codec with the same record layout.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ultraviolet::DVec3;

use crate::engine::{Integrator, Particle, SimView};

/// Scalar copy of the simulation state, pointers excluded. Field order is
/// the wire format; any change here breaks old snapshots by design.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub n: u64,
    pub n_active: i64,
    pub t: f64,
    pub dt: f64,
    pub integrator: Integrator,
    pub g: f64,
    pub boxsize: DVec3,
    pub nghost: [u32; 3],
    pub shear_omega: f64,
}

impl SnapshotHeader {
    pub fn from_view(view: &SimView) -> Self {
        Self {
            n: view.n() as u64,
            n_active: view.n_active,
            t: view.t,
            dt: view.dt,
            integrator: view.integrator,
            g: view.g,
            boxsize: view.boxsize,
            nghost: view.nghost,
            shear_omega: view.shear_omega,
        }
    }
}

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("snapshot i/o failed")]
    Io(#[from] std::io::Error),

    #[error("snapshot header unreadable")]
    Header(#[source] bincode::Error),

    #[error("snapshot truncated: header advertises {expected} particles, stream ends after {read}")]
    Truncated { expected: u64, read: u64 },
}

fn encode_err(e: bincode::Error) -> SnapshotError {
    match *e {
        bincode::ErrorKind::Io(io) => SnapshotError::Io(io),
        other => SnapshotError::Header(Box::new(other)),
    }
}

/// Write the header, then exactly N particle records in index order. The
/// write is not atomic: an interrupted writer leaves a stream whose header
/// advertises more records than follow, which `read_snapshot` rejects.
pub fn write_snapshot<W: Write>(view: &SimView, mut w: W) -> Result<(), SnapshotError> {
    let header = SnapshotHeader::from_view(view);
    bincode::serialize_into(&mut w, &header).map_err(encode_err)?;
    for p in view.particles {
        bincode::serialize_into(&mut w, p).map_err(encode_err)?;
    }
    Ok(())
}

/// Read a header and the N particle records it advertises. Under-length
/// input surfaces as `Truncated`, never as a zero-filled or short state.
pub fn read_snapshot<R: Read>(mut r: R) -> Result<(SnapshotHeader, Vec<Particle>), SnapshotError> {
    let header: SnapshotHeader =
        bincode::deserialize_from(&mut r).map_err(SnapshotError::Header)?;
    // Cap the preallocation; a garbage header should not reserve gigabytes.
    let mut particles = Vec::with_capacity(header.n.min(1 << 20) as usize);
    for read in 0..header.n {
        match bincode::deserialize_from::<_, Particle>(&mut r) {
            Ok(p) => particles.push(p),
            // Without a checksum, a decode failure mid-record cannot be
            // told apart from a short write.
            Err(_) => {
                return Err(SnapshotError::Truncated {
                    expected: header.n,
                    read,
                })
            }
        }
    }
    Ok((header, particles))
}

/// File-path convenience over `write_snapshot`. Open or write failures are
/// reported and dropped; the caller's loop proceeds either way.
pub fn write_snapshot_file<P: AsRef<Path>>(view: &SimView, path: P) {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            let _ = std::fs::create_dir_all(parent);
        }
    }
    let file = match File::create(path) {
        Ok(f) => f,
        Err(e) => {
            log::error!("error while opening file '{}': {e}", path.display());
            return;
        }
    };
    if let Err(e) = write_snapshot(view, BufWriter::new(file)) {
        log::error!("error while writing snapshot '{}': {e}", path.display());
    }
}

/// File-path convenience over `read_snapshot`. Truncation is fatal to the
/// load, not to the process.
pub fn read_snapshot_file<P: AsRef<Path>>(
    path: P,
) -> Result<(SnapshotHeader, Vec<Particle>), SnapshotError> {
    let file = File::open(path.as_ref())?;
    read_snapshot(BufReader::new(file))
}
