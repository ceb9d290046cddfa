//! Per-lane dead write elimination for vector values.
//!
//! Plain dead code elimination keeps a vector alive as soon as any of it is read. This pass
//! instead works out which *lanes* of each vector are ever read, following values backwards
//! through inserts, extracts, constructs, shuffles and phis (loops included), and then:
//!
//! - removes inserts into lanes nobody reads, by pointing their users at the insert's base;
//! - erases vectors none of whose lanes are read, along with whatever fed only them.
//!
//! Any other instruction that reads a vector is assumed to need all of it.

use crate::ir::*;

// ------------------------------------------------------------------------------------------------
// Sub-modules
// ------------------------------------------------------------------------------------------------

pub mod lanes;
pub mod liveness;
pub mod rewrite;
pub mod transfer;

pub use lanes::*;
pub use liveness::*;
pub use transfer::*;

#[cfg(test)]
mod tests;

// ------------------------------------------------------------------------------------------------
// VectorDceConfig
// ------------------------------------------------------------------------------------------------

/// Options for [`VectorDce`].
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct VectorDceConfig {
	/// Erase dead inserts, vectors with no live lanes, and whatever is orphaned by that. When
	/// `false`, dead inserts are only bypassed and cleaning up is left to some later pass.
	pub delete_dead: bool,
	/// How many analyze/rewrite rounds one `run` may take before giving up.
	pub max_rounds: usize,
}

impl Default for VectorDceConfig {
	fn default() -> Self {
		Self {
			delete_dead: true,
			max_rounds:  16,
		}
	}
}

impl VectorDceConfig {
	pub fn delete_dead(self, delete_dead: bool) -> Self {
		Self { delete_dead, ..self }
	}

	pub fn max_rounds(self, max_rounds: usize) -> Self {
		Self { max_rounds, ..self }
	}
}

// ------------------------------------------------------------------------------------------------
// VectorDce
// ------------------------------------------------------------------------------------------------

/// The pass. It only holds options, so one instance can be run on any number of functions.
#[derive(Debug, Default, Clone)]
pub struct VectorDce {
	config: VectorDceConfig,
}

impl VectorDce {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_config(config: VectorDceConfig) -> Self {
		Self { config }
	}

	pub fn config(&self) -> &VectorDceConfig {
		&self.config
	}

	/// Runs the pass on every function in `module`. Returns `true` if any of them changed.
	pub fn run_module(&self, module: &mut Module) -> bool {
		let (types, globals, funcs) = module.parts_mut();
		let mut changed = false;

		for func in funcs.iter_mut() {
			changed |= self.run(types, globals, func);
		}

		changed
	}

	/// Runs the pass on `func`, which must be well-formed (see [`verify_function`]). Returns
	/// `true` if it changed. Running it again right after returns `false`.
	pub fn run(&self, types: &TypeTable, globals: &Globals, func: &mut Function) -> bool {
		let mut changed = false;

		if log::log_enabled!(log::Level::Debug) {
			debug_dump_cfg(func);
		}

		for round in 0 .. self.config.max_rounds {
			let mut du = DefUse::build(func);
			let q = ValueLanes::new(types, globals, func);
			let liveness = analyze_function(func, &du, &q);

			if !rewrite::apply_liveness(func, &mut du, &q, &liveness, self.config.delete_dead) {
				log::debug!("{}: done after {} round(s), changed = {}", func.name(), round + 1, changed);
				return changed;
			}

			changed = true;
		}

		log::warn!("{}: still changing after {} rounds; stopping", func.name(), self.config.max_rounds);
		changed
	}

	/// Only the analysis. `func` is not touched.
	pub fn analyze(&self, types: &TypeTable, globals: &Globals, func: &Function) -> LaneLiveness {
		let du = DefUse::build(func);
		let q = ValueLanes::new(types, globals, func);
		analyze_function(func, &du, &q)
	}
}
