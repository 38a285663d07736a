//! # Collection of tracks from one tracker run
//!
//! A [`TrackRun`] owns the tracks of one (dataset, tracker run, time window) together with
//! the names of their auxiliary fields. It supports:
//!
//! * **concatenation** ([`TrackRun::append`]) – track indices of the appended run are
//!   renumbered after the current maximum so that they stay unique,
//! * **time slicing** ([`TrackRun::time_slice`]) – whole tracks lying inside a date window,
//! * **subsets** ([`TrackRun::subset`]) – tracks carrying a classification label,
//! * **classification** ([`TrackRun::categorise`]) and **matching**
//!   ([`TrackRun::match_tracks`]), delegated to [`crate::categorise`] and [`crate::matching`],
//! * **archive round-trip** through any [`ArchiveStore`](crate::tracks::archive::ArchiveStore).
use camino::Utf8Path;

use crate::{
    categorise::{classify, Condition},
    constants::TrackIdx,
    matching::{match_tracks, MatchConfig, MatchPair},
    polarlows_errors::PolarLowsError,
    time::{end_of_day_exclusive, iso_date_to_epoch, unix_minutes},
};

use super::{vortrack_reader::read_vortrack_dir, Track};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackRun {
    aux_names: Vec<String>,
    tracks: Vec<Track>,
}

impl TrackRun {
    /// An empty run with the given auxiliary field names.
    pub fn new(aux_names: Vec<String>) -> Self {
        TrackRun {
            aux_names,
            tracks: Vec::new(),
        }
    }

    /// Build a run from already validated tracks.
    ///
    /// Return
    /// ----------
    /// * [`PolarLowsError::InvalidParameter`] if two tracks share an index or if a fix carries
    ///   a number of auxiliary values different from `aux_names.len()`.
    pub fn from_tracks(aux_names: Vec<String>, tracks: Vec<Track>) -> Result<Self, PolarLowsError> {
        let mut seen = ahash::AHashSet::with_capacity(tracks.len());
        for track in &tracks {
            if !seen.insert(track.idx()) {
                return Err(PolarLowsError::InvalidParameter(format!(
                    "duplicated track index {}",
                    track.idx()
                )));
            }
            if let Some(fix) = track.fixes().iter().find(|f| f.aux.len() != aux_names.len()) {
                return Err(PolarLowsError::InvalidParameter(format!(
                    "track {}: fix at {} has {} auxiliary values, expected {}",
                    track.idx(),
                    fix.time,
                    fix.aux.len(),
                    aux_names.len()
                )));
            }
        }
        Ok(TrackRun { aux_names, tracks })
    }

    /// Load the raw tracker output of one directory.
    ///
    /// Arguments
    /// -----------------
    /// * `dir` – Directory containing `vortrack*.txt` files.
    /// * `columns` – Column names of the files, in order.
    ///
    /// See also
    /// ------------
    /// * [`read_vortrack_dir`] – File format and error policy.
    pub fn from_dir(dir: &Utf8Path, columns: &[String]) -> Result<Self, PolarLowsError> {
        read_vortrack_dir(dir, columns)
    }

    #[inline]
    pub fn aux_names(&self) -> &[String] {
        &self.aux_names
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    #[inline]
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub(crate) fn tracks_mut(&mut self) -> &mut [Track] {
        &mut self.tracks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Track> {
        self.tracks.iter()
    }

    pub fn get(&self, idx: TrackIdx) -> Option<&Track> {
        self.tracks.iter().find(|t| t.idx() == idx)
    }

    /// Tracks carrying `label`, in run order.
    pub fn subset<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a Track> + 'a {
        self.tracks.iter().filter(move |t| t.has_category(label))
    }

    /// Number of tracks, optionally restricted to a classification subset.
    pub fn size(&self, subset: Option<&str>) -> usize {
        match subset {
            Some(label) => self.subset(label).count(),
            None => self.len(),
        }
    }

    fn next_idx(&self) -> TrackIdx {
        self.tracks.iter().map(|t| t.idx() + 1).max().unwrap_or(0)
    }

    /// Concatenate `other` into `self`.
    ///
    /// The tracks of `other` keep their relative order and are renumbered from
    /// `max(self indices) + 1`. An empty `self` adopts the auxiliary names of `other`; two
    /// non-empty runs must have identical auxiliary names.
    pub fn append(&mut self, other: TrackRun) -> Result<(), PolarLowsError> {
        if other.is_empty() {
            if self.is_empty() && self.aux_names.is_empty() {
                self.aux_names = other.aux_names;
            }
            return Ok(());
        }
        if self.is_empty() {
            self.aux_names = other.aux_names.clone();
        } else if self.aux_names != other.aux_names {
            return Err(PolarLowsError::InvalidParameter(format!(
                "cannot concatenate runs with different auxiliary fields ({:?} vs {:?})",
                self.aux_names, other.aux_names
            )));
        }

        let offset = self.next_idx();
        let mut incoming = other.tracks;
        incoming.sort_by_key(|t| t.idx());
        for (i, mut track) in incoming.into_iter().enumerate() {
            track.set_idx(offset + i as TrackIdx);
            self.tracks.push(track);
        }
        Ok(())
    }

    /// Keep the tracks lying entirely within `[start 00:00, end 23:59:59]`.
    ///
    /// Arguments
    /// -----------------
    /// * `start`, `end` – ISO dates `YYYY-MM-DD`; the end date is inclusive.
    ///
    /// Return
    /// ----------
    /// * A new run with the selected tracks; indices and labels are preserved.
    pub fn time_slice(&self, start: &str, end: &str) -> Result<TrackRun, PolarLowsError> {
        let start_min = unix_minutes(&iso_date_to_epoch(start)?);
        let end_min = unix_minutes(&end_of_day_exclusive(end)?);
        if end_min <= start_min {
            return Err(PolarLowsError::InvalidParameter(format!(
                "empty time window {start} .. {end}"
            )));
        }
        Ok(TrackRun {
            aux_names: self.aux_names.clone(),
            tracks: self
                .tracks
                .iter()
                .filter(|t| t.within_minutes(start_min, end_min))
                .cloned()
                .collect(),
        })
    }

    /// Tag the tracks of this run (see [`classify`]).
    pub fn categorise(&mut self, conditions: &[Condition<'_>], strict: bool) {
        classify(self, conditions, strict);
    }

    /// Remove every classification label.
    pub fn clear_categories(&mut self) {
        self.tracks.iter_mut().for_each(Track::clear_categories);
    }

    /// Pair the tracks of `subset` with `references` (see [`match_tracks`]).
    ///
    /// The first element of each returned pair is the candidate's [`Track::idx`].
    pub fn match_tracks<R: AsRef<Track>>(
        &self,
        references: &[R],
        subset: Option<&str>,
        config: &MatchConfig,
    ) -> Result<Vec<MatchPair>, PolarLowsError> {
        let candidates: Vec<&Track> = match subset {
            Some(label) => self.subset(label).collect(),
            None => self.tracks.iter().collect(),
        };
        match_tracks(&candidates, references, config)
    }
}

impl<'a> IntoIterator for &'a TrackRun {
    type Item = &'a Track;
    type IntoIter = std::slice::Iter<'a, Track>;

    fn into_iter(self) -> Self::IntoIter {
        self.tracks.iter()
    }
}
