
use std::collections::{ HashSet };
use std::error::Error;

use colored::*;
use simplelog::*;

use ::vdce::*;

fn main() -> Result<(), Box<dyn Error>> {
	better_panic::install();
	TermLogger::init(LevelFilter::Info, Config::default(), TerminalMode::Mixed)?;

	demo("insert after insert", insert_after_insert()?);
	demo("dead lane in a loop", dead_lane_in_loop()?);
	Ok(())
}

/// Runs the pass over `m` and shows what it removed.
fn demo(title: &str, mut m: Module) {
	println!("{}", format!("===== {} =====", title).bold());
	println!("{}", m.display());

	let before = m.funcs().map(|f| f.display(&m.types).to_string()).collect::<Vec<_>>();
	let changed = VectorDce::new().run_module(&mut m);

	println!("{}", format!("----- after (changed = {}) -----", changed).bold());

	for (func, before) in m.funcs().zip(before.iter()) {
		let after = func.display(&m.types).to_string();
		let kept = after.lines().collect::<HashSet<_>>();

		for line in before.lines() {
			if kept.contains(line) {
				println!("  {}", line);
			} else {
				println!("{}", format!("- {}", line).red());
			}
		}
	}

	println!();
}

// v = In2; v.x = In0 + In1; v.x = 0.0; OutColor = v.xyxy;
fn insert_after_insert() -> IrResult<Module> {
	let mut m = Module::new();
	let f32_ = m.types.float(32);
	let v2 = m.types.vector(f32_, 2);
	let v4 = m.types.vector(f32_, 4);
	let in2 = m.add_variable(v2, StorageClass::Input);
	let in0 = m.add_variable(f32_, StorageClass::Input);
	let in1 = m.add_variable(f32_, StorageClass::Input);
	let zero = m.const_f32(0.0);
	let out = m.add_variable(v4, StorageClass::Output);

	let mut b = FunctionBuilder::new(&mut m, "main");
	b.block();
	let v = b.load(in2);
	let x = b.load(in0);
	let y = b.load(in1);
	let sum = b.fadd(x, y);
	let first = b.insert(sum, v, 0);
	let second = b.insert(zero, first, 0);
	let sh = b.shuffle(second, second, &[0, 1, 0, 1]);
	b.store(out, sh);
	b.ret();
	b.finish()?;

	Ok(m)
}

// v = vec2(0.0, 1.0); for (i = 0; i < n; i++) { v.x = v.x + 1.0; v.y = 0.5; } OutColor = vec4(v.x);
fn dead_lane_in_loop() -> IrResult<Module> {
	let mut m = Module::new();
	let f32_ = m.types.float(32);
	let i32_ = m.types.int(32, true);
	let v2 = m.types.vector(f32_, 2);
	let v4 = m.types.vector(f32_, 4);
	let zero = m.const_f32(0.0);
	let one = m.const_f32(1.0);
	let init = m.add_constant_composite(v2, vec![zero, one]);
	let half = m.const_f32(0.5);
	let n_var = m.add_variable(i32_, StorageClass::Uniform);
	let i0 = m.const_i32(0);
	let i1 = m.const_i32(1);
	let out = m.add_variable(v4, StorageClass::Output);

	let mut b = FunctionBuilder::new(&mut m, "main");
	let entry = b.block();
	let header = b.block();
	let body = b.block();
	let exit = b.block();
	b.br(header);

	b.switch_to(header);
	let p = b.phi(v2, &[(init, entry)]);
	let i = b.phi(i32_, &[(i0, entry)]);
	let n = b.load(n_var);
	let c = b.slt(i, n);
	b.brc(c, body, exit);

	b.switch_to(body);
	let x = b.extract(p, 0);
	let x1 = b.fadd(x, one);
	let v1 = b.insert(x1, p, 0);
	let v2_ = b.insert(half, v1, 1);
	let inext = b.iadd(i, i1);
	b.br(header);
	b.add_incoming(p, v2_, body);
	b.add_incoming(i, inext, body);

	b.switch_to(exit);
	let o = b.extract(p, 0);
	let res = b.construct(v4, &[o, o, o, o]);
	b.store(out, res);
	b.ret();
	b.finish()?;

	Ok(m)
}
