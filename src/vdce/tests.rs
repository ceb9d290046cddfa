use simplelog::{ Config, LevelFilter, TestLogger };

use super::*;

// ------------------------------------------------------------------------------------------------
// Helpers
// ------------------------------------------------------------------------------------------------

fn setup_logging() {
	// more than one test may try to install it.
	let _ = TestLogger::init(LevelFilter::Trace, Config::default());
}

fn text(m: &Module, f: FuncId) -> String {
	m.func(f).display(&m.types).to_string()
}

fn lines(lines: &[&str]) -> String {
	lines.iter().map(|l| format!("{}\n", l)).collect()
}

fn run_with(m: &mut Module, f: FuncId, config: VectorDceConfig) -> bool {
	setup_logging();
	let (types, globals, funcs) = m.parts_mut();
	VectorDce::with_config(config).run(types, globals, &mut funcs[f.0])
}

fn run(m: &mut Module, f: FuncId) -> bool {
	run_with(m, f, VectorDceConfig::default())
}

fn live(m: &Module, f: FuncId, v: ValueId) -> LaneSet {
	VectorDce::new().analyze(&m.types, &m.globals, m.func(f)).live(v)
}

// each instruction is visited once as a seed, and again only when its result's set grows, which
// happens at most once per lane.
fn max_visits(m: &Module, f: FuncId) -> usize {
	let func = m.func(f);
	let q = ValueLanes::new(&m.types, &m.globals, func);

	func.insts()
		.map(|(_, inst)| inst.result().and_then(|r| q.tracked_lanes(r)).unwrap_or(1) as usize + 1)
		.sum()
}

#[track_caller]
fn check_unchanged(m: &mut Module, f: FuncId) {
	let before = text(m, f);
	assert!(!run(m, f), "pass reported a change");
	assert_eq!(text(m, f), before);
}

#[track_caller]
fn check_changed(m: &mut Module, f: FuncId, expected: &[&str]) {
	let expected = lines(expected);
	assert!(run(m, f), "pass reported no change");
	assert_eq!(text(m, f), expected);
	verify_function(&m.types, &m.globals, m.func(f)).unwrap();

	// and again, which should do nothing.
	assert!(!run(m, f), "second run reported a change");
	assert_eq!(text(m, f), expected);
}

// ------------------------------------------------------------------------------------------------
// Straight-line code
// ------------------------------------------------------------------------------------------------

// v = In2; v.x = In0 + In1; v.x = 0.0; OutColor = v.xyxy;
fn insert_after_insert() -> (Module, FuncId) {
	let mut m = Module::new();
	let f32_ = m.types.float(32);
	let v2 = m.types.vector(f32_, 2);
	let v4 = m.types.vector(f32_, 4);
	let in2 = m.add_variable(v2, StorageClass::Input);    // %1
	let in0 = m.add_variable(f32_, StorageClass::Input);  // %2
	let in1 = m.add_variable(f32_, StorageClass::Input);  // %3
	let zero = m.const_f32(0.0);                          // %4
	let out = m.add_variable(v4, StorageClass::Output);   // %5

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
	let f = b.finish().unwrap();
	(m, f)
}

#[test]
fn insert_after_insert_elim() {
	let (mut m, f) = insert_after_insert();

	assert_eq!(live(&m, f, ValueId(11)), LaneSet::All);
	assert_eq!(live(&m, f, ValueId(10)), LaneSet::single(1));
	// the load is used, so it's a root.
	assert_eq!(live(&m, f, ValueId(6)), LaneSet::All);

	check_changed(&mut m, f, &[
		"fn main {",
		"bb0:",
		"    %6 = load v2f32 %1",
		"    %11 = insert v2f32 %4 %6 0",
		"    %12 = shuffle v4f32 %11 %11 0 1 0 1",
		"    store %5 %12",
		"    ret",
		"}",
	]);
}

#[test]
fn insert_after_insert_without_deleting() {
	let (mut m, f) = insert_after_insert();
	let config = VectorDceConfig::default().delete_dead(false);
	let expected = lines(&[
		"fn main {",
		"bb0:",
		"    %6 = load v2f32 %1",
		"    %7 = load f32 %2",
		"    %8 = load f32 %3",
		"    %9 = fadd f32 %7 %8",
		"    %10 = insert v2f32 %9 %6 0",
		"    %11 = insert v2f32 %4 %6 0",
		"    %12 = shuffle v4f32 %11 %11 0 1 0 1",
		"    store %5 %12",
		"    ret",
		"}",
	]);

	assert!(run_with(&mut m, f, config));
	assert_eq!(text(&m, f), expected);

	// the bypassed insert has no uses left, so there's nothing more to do.
	assert!(!run_with(&mut m, f, config));
	assert_eq!(text(&m, f), expected);
}

// v = In; v.y = x; OutColor = vec4(op(v).x); where op is either nothing or v + v.
fn lane_one_write(through_fadd: bool) -> (Module, FuncId) {
	let mut m = Module::new();
	let f32_ = m.types.float(32);
	let v2 = m.types.vector(f32_, 2);
	let v4 = m.types.vector(f32_, 4);
	let in_v = m.add_variable(v2, StorageClass::Input);   // %1
	let in_x = m.add_variable(f32_, StorageClass::Input); // %2
	let out = m.add_variable(v4, StorageClass::Output);   // %3

	let mut b = FunctionBuilder::new(&mut m, "main");
	b.block();
	let v = b.load(in_v);
	let x = b.load(in_x);
	let mut a = b.insert(x, v, 1);

	if through_fadd {
		a = b.fadd(a, a);
	}

	let e = b.extract(a, 0);
	let res = b.construct(v4, &[e, e, e, e]);
	b.store(out, res);
	b.ret();
	let f = b.finish().unwrap();
	(m, f)
}

#[test]
fn dead_lane_write() {
	let (mut m, f) = lane_one_write(false);

	check_changed(&mut m, f, &[
		"fn main {",
		"bb0:",
		"    %4 = load v2f32 %1",
		"    %7 = extract f32 %4 0",
		"    %8 = construct v4f32 %7 %7 %7 %7",
		"    store %3 %8",
		"    ret",
		"}",
	]);
}

#[test]
fn fallback_forces_all_lanes() {
	// same as above, but the vector goes through an fadd, which needs every lane.
	let (mut m, f) = lane_one_write(true);

	assert_eq!(live(&m, f, ValueId(6)), LaneSet::All);
	assert_eq!(live(&m, f, ValueId(7)), LaneSet::All);
	check_unchanged(&mut m, f);
}

#[test]
fn fully_live() {
	let mut m = Module::new();
	let f32_ = m.types.float(32);
	let v4 = m.types.vector(f32_, 4);
	let in_ = m.add_variable(f32_, StorageClass::Input);
	let out0 = m.add_variable(v4, StorageClass::Output);
	let out1 = m.add_variable(v4, StorageClass::Output);

	let mut b = FunctionBuilder::new(&mut m, "main");
	b.block();
	let parts = (0 .. 4).map(|_| b.load(in_)).collect::<Vec<_>>();
	let v = b.construct(v4, &parts);
	let w = b.insert(parts[0], v, 2);
	let sh = b.shuffle(w, v, &[0, 5, 2, 7]);
	b.store(out0, sh);
	b.store(out1, v);
	b.ret();
	let f = b.finish().unwrap();

	assert_eq!(live(&m, f, v), LaneSet::All);
	assert_eq!(live(&m, f, w), LaneSet::Lanes(0b0101));
	check_unchanged(&mut m, f);
}

#[test]
fn construct_with_dead_operands_is_left_alone() {
	let mut m = Module::new();
	let f32_ = m.types.float(32);
	let v2 = m.types.vector(f32_, 2);
	let v3 = m.types.vector(f32_, 3);
	let v4 = m.types.vector(f32_, 4);
	let in_ = m.add_variable(f32_, StorageClass::Input);
	let in_v = m.add_variable(v2, StorageClass::Input);
	let out = m.add_variable(v4, StorageClass::Output);

	let mut b = FunctionBuilder::new(&mut m, "main");
	b.block();
	let a = b.load(in_);
	let bb = b.load(in_);
	let c = b.load(in_);
	let v = b.construct(v3, &[a, bb, c]);
	let e = b.extract(v, 0);
	let w = b.load(in_v);
	let u = b.construct(v4, &[w, e, e]);
	let g = b.extract(u, 2);
	let res = b.construct(v4, &[e, g, g, g]);
	b.store(out, res);
	b.ret();
	let f = b.finish().unwrap();

	// the analysis knows these lanes are never read...
	assert_eq!(live(&m, f, v), LaneSet::single(0));
	assert_eq!(live(&m, f, bb), LaneSet::EMPTY);
	assert_eq!(live(&m, f, c), LaneSet::EMPTY);
	assert_eq!(live(&m, f, u), LaneSet::single(2));

	// a used load is a root, so the vector one counts as entirely live regardless.
	assert_eq!(live(&m, f, w), LaneSet::All);

	// ...but the operands are not replaced.
	check_unchanged(&mut m, f);
}

#[test]
fn shuffle_with_dead_operand_is_left_alone() {
	let mut m = Module::new();
	let f32_ = m.types.float(32);
	let v3 = m.types.vector(f32_, 3);
	let v4 = m.types.vector(f32_, 4);
	let one = m.const_f32(1.0);
	let ones = m.add_constant_composite(v3, vec![one, one, one]);
	let in_ = m.add_variable(f32_, StorageClass::Input);
	let out = m.add_variable(v4, StorageClass::Output);

	let mut b = FunctionBuilder::new(&mut m, "main");
	b.block();
	let a = b.load(in_);
	let bb = b.load(in_);
	let c = b.load(in_);
	let v = b.construct(v3, &[c, bb, a]);
	let sh = b.shuffle(ones, v, &[0, 4, 5]);
	let e = b.extract(sh, 0);
	let res = b.construct(v4, &[e, e, e, e]);
	b.store(out, res);
	b.ret();
	let f = b.finish().unwrap();

	assert_eq!(live(&m, f, sh), LaneSet::single(0));
	assert_eq!(live(&m, f, ones), LaneSet::single(0));
	assert_eq!(live(&m, f, v), LaneSet::EMPTY);
	check_unchanged(&mut m, f);
}

#[test]
fn wide_vectors_are_not_tracked() {
	let mut m = Module::new();
	let f32_ = m.types.float(32);
	let wide = m.types.vector(f32_, 100);
	let in_ = m.add_variable(wide, StorageClass::Input);
	let x = m.const_f32(2.0);
	let out = m.add_variable(wide, StorageClass::Output);

	let mut b = FunctionBuilder::new(&mut m, "main");
	b.block();
	let v = b.load(in_);
	let first = b.insert(x, v, 0);
	let second = b.insert(x, first, 0);
	b.store(out, second);
	b.ret();
	let f = b.finish().unwrap();

	assert_eq!(live(&m, f, first), LaneSet::All);
	check_unchanged(&mut m, f);
}

#[test]
fn opaque_users_need_every_lane() {
	let mut m = Module::new();
	let f32_ = m.types.float(32);
	let v4 = m.types.vector(f32_, 4);
	let in_v = m.add_variable(v4, StorageClass::Input);
	let in_x = m.add_variable(f32_, StorageClass::Input);
	let out = m.add_variable(f32_, StorageClass::Output);

	let mut b = FunctionBuilder::new(&mut m, "main");
	b.block();
	let v = b.load(in_v);
	let x = b.load(in_x);
	let writes = (0 .. 4).map(|lane| b.insert(x, v, lane)).collect::<Vec<_>>();
	let c = b.copy(writes[0]);
	let c0 = b.extract(c, 0);
	let d = b.dot(writes[1], v);
	let e = b.ext_inst(f32_, 69, &[writes[2]]);
	b.call_void(&[writes[3]]);
	let sum = b.fadd(c0, d);
	let sum = b.fadd(sum, e);
	b.store(out, sum);
	b.ret();
	let f = b.finish().unwrap();

	for &w in writes.iter() {
		assert_eq!(live(&m, f, w), LaneSet::All);
	}

	check_unchanged(&mut m, f);
}

#[test]
fn unused_ext_inst_is_removed() {
	let mut m = Module::new();
	let f32_ = m.types.float(32);
	let v2 = m.types.vector(f32_, 2);
	let in_v = m.add_variable(v2, StorageClass::Input);
	let in_x = m.add_variable(f32_, StorageClass::Input);

	let mut b = FunctionBuilder::new(&mut m, "main");
	b.block();
	let v = b.load(in_v);
	let x = b.load(in_x);
	let a = b.insert(x, v, 0);
	let e = b.ext_inst(v2, 4, &[a]);
	b.ret();
	let f = b.finish().unwrap();

	// extended instructions are pure, so an unused one demands nothing.
	assert!(live(&m, f, a).is_empty());
	assert!(live(&m, f, e).is_empty());

	check_changed(&mut m, f, &[
		"fn main {",
		"bb0:",
		"    ret",
		"}",
	]);
}

#[test]
fn unused_vector_chain_is_removed() {
	let mut m = Module::new();
	let f32_ = m.types.float(32);
	let v4 = m.types.vector(f32_, 4);
	let in_v = m.add_variable(v4, StorageClass::Input);
	let in_ = m.add_variable(f32_, StorageClass::Input);

	let mut b = FunctionBuilder::new(&mut m, "main");
	b.block();
	let v = b.load(in_v);
	let x = b.load(in_);
	let a = b.insert(x, v, 0);
	let y = b.load(in_);
	b.insert(y, a, 1);
	b.ret();
	let f = b.finish().unwrap();

	check_changed(&mut m, f, &[
		"fn main {",
		"bb0:",
		"    ret",
		"}",
	]);
}

// ------------------------------------------------------------------------------------------------
// Control flow
// ------------------------------------------------------------------------------------------------

// v = In0; v.z = In1 + In2; if (g) v.w = 1.0; OutColor = vec4(v.x, v.y, 0.0, v.w);
#[test]
fn dead_insert_in_chain_with_phi() {
	let mut m = Module::new();
	let f32_ = m.types.float(32);
	let u32_ = m.types.int(32, false);
	let v4 = m.types.vector(f32_, 4);
	let in0 = m.add_variable(v4, StorageClass::Input);     // %1
	let in1 = m.add_variable(f32_, StorageClass::Input);   // %2
	let in2 = m.add_variable(f32_, StorageClass::Input);   // %3
	let g = m.add_variable(u32_, StorageClass::Uniform);   // %4
	let uint_0 = m.add_constant(u32_, 0);                  // %5
	let one = m.const_f32(1.0);                            // %6
	let out = m.add_variable(v4, StorageClass::Output);    // %7
	let zero = m.const_f32(0.0);                           // %8

	let mut b = FunctionBuilder::new(&mut m, "main");
	let entry = b.block();
	let then = b.block();
	let merge = b.block();

	let v = b.load(in0);
	let x = b.load(in1);
	let y = b.load(in2);
	let sum = b.fadd(x, y);
	let z = b.insert(sum, v, 2);
	let gv = b.load(g);
	let cond = b.ine(gv, uint_0);
	b.brc(cond, then, merge);

	b.switch_to(then);
	let w = b.insert(one, z, 3);
	b.br(merge);

	b.switch_to(merge);
	let p = b.phi(v4, &[(z, entry), (w, then)]);
	let px = b.extract(p, 0);
	let py = b.extract(p, 1);
	let pw = b.extract(p, 3);
	let res = b.construct(v4, &[px, py, zero, pw]);
	b.store(out, res);
	b.ret();
	let f = b.finish().unwrap();

	assert_eq!(live(&m, f, p), LaneSet::Lanes(0b1011));
	assert_eq!(live(&m, f, z), LaneSet::Lanes(0b1011));

	check_changed(&mut m, f, &[
		"fn main {",
		"bb0:",
		"    %9 = load v4f32 %1",
		"    %14 = load u32 %4",
		"    %15 = ine bool %14 %5",
		"    brc %15 bb1 bb2",
		"bb1:",
		"    %16 = insert v4f32 %6 %9 3",
		"    br bb2",
		"bb2:",
		"    %17 = phi v4f32 %9 bb0 %16 bb1",
		"    %18 = extract f32 %17 0",
		"    %19 = extract f32 %17 1",
		"    %20 = extract f32 %17 3",
		"    %21 = construct v4f32 %18 %19 %8 %20",
		"    store %7 %21",
		"    ret",
		"}",
	]);
}

// v = vec2(0.0, 1.0); for (i = 0; i < n; i++) { v.x = v.x + 1.0; v.y = 0.5; } OutColor = vec4(v.x);
#[test]
fn dead_insert_in_loop() {
	let mut m = Module::new();
	let f32_ = m.types.float(32);
	let i32_ = m.types.int(32, true);
	let v2 = m.types.vector(f32_, 2);
	let v4 = m.types.vector(f32_, 4);
	let zero = m.const_f32(0.0);                            // %1
	let one = m.const_f32(1.0);                             // %2
	let init = m.add_constant_composite(v2, vec![zero, one]); // %3
	let half = m.const_f32(0.5);                            // %4
	let n_var = m.add_variable(i32_, StorageClass::Uniform); // %5
	let i0 = m.const_i32(0);                                // %6
	let i1 = m.const_i32(1);                                // %7
	let out = m.add_variable(v4, StorageClass::Output);     // %8

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
	let f = b.finish().unwrap();

	let liveness = VectorDce::new().analyze(&m.types, &m.globals, m.func(f));
	assert_eq!(liveness.live(p), LaneSet::single(0));
	assert_eq!(liveness.live(v2_), LaneSet::single(0));
	assert_eq!(liveness.live(init), LaneSet::single(0));
	assert!(liveness.live(half).is_empty());
	assert!(liveness.iter().all(|(v, lanes)| v != half && !lanes.is_empty()));
	assert!(liveness.iter().any(|(v, _)| v == p));
	assert!(liveness.visits() <= max_visits(&m, f));

	check_changed(&mut m, f, &[
		"fn main {",
		"bb0:",
		"    br bb1",
		"bb1:",
		"    %9 = phi v2f32 %3 bb0 %15 bb2",
		"    %10 = phi i32 %6 bb0 %17 bb2",
		"    %11 = load i32 %5",
		"    %12 = islt bool %10 %11",
		"    brc %12 bb2 bb3",
		"bb2:",
		"    %13 = extract f32 %9 0",
		"    %14 = fadd f32 %13 %2",
		"    %15 = insert v2f32 %14 %9 0",
		"    %17 = iadd i32 %10 %7",
		"    br bb1",
		"bb3:",
		"    %18 = extract f32 %9 0",
		"    %19 = construct v4f32 %18 %18 %18 %18",
		"    store %8 %19",
		"    ret",
		"}",
	]);
}

// v = vec2(0.0, 1.0); for (...) { v.x = v.x + 1; v.y = v.y * 0.75; } OutColor = vec4(v.x);
// v.y is dead, but it travels around the loop as a scalar, which isn't tracked.
#[test]
fn dead_insert_kept_by_scalar_proxy() {
	let mut m = Module::new();
	let f32_ = m.types.float(32);
	let i32_ = m.types.int(32, true);
	let v2 = m.types.vector(f32_, 2);
	let v4 = m.types.vector(f32_, 4);
	let zero = m.const_f32(0.0);
	let one = m.const_f32(1.0);
	let init = m.add_constant_composite(v2, vec![zero, one]);
	let i0 = m.const_i32(0);
	let n_var = m.add_variable(i32_, StorageClass::Uniform);
	let k = m.const_f32(0.75);
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
	let y = b.extract(v1, 1);
	let y1 = b.fmul(y, k);
	let v2_ = b.insert(y1, v1, 1);
	let inext = b.iadd(i, i1);
	b.br(header);
	b.add_incoming(p, v2_, body);
	b.add_incoming(i, inext, body);

	b.switch_to(exit);
	let o = b.extract(p, 0);
	let res = b.construct(v4, &[o, o, o, o]);
	b.store(out, res);
	b.ret();
	let f = b.finish().unwrap();

	assert_eq!(live(&m, f, p), LaneSet::All);
	assert_eq!(live(&m, f, v2_), LaneSet::All);

	let liveness = VectorDce::new().analyze(&m.types, &m.globals, m.func(f));
	assert!(liveness.visits() <= max_visits(&m, f));
	check_unchanged(&mut m, f);
}

// v.x = 0.0; v.y = 0.1; for (...) { v.x = v.x + 1; v = v * 0.9; } OutColor = vec4(v.x);
// v.y is dead, but the vector times scalar needs every lane.
#[test]
fn vector_arithmetic_in_loop() {
	let mut m = Module::new();
	let f32_ = m.types.float(32);
	let i32_ = m.types.int(32, true);
	let v2 = m.types.vector(f32_, 2);
	let v4 = m.types.vector(f32_, 4);
	let undef = m.add_undef(v2);
	let zero = m.const_f32(0.0);
	let tenth = m.const_f32(0.1);
	let i0 = m.const_i32(0);
	let i20 = m.const_i32(20);
	let one = m.const_f32(1.0);
	let k = m.const_f32(0.9);
	let i1 = m.const_i32(1);
	let out = m.add_variable(v4, StorageClass::Output);

	let mut b = FunctionBuilder::new(&mut m, "main");
	let entry = b.block();
	let header = b.block();
	let body = b.block();
	let exit = b.block();
	let a = b.insert(zero, undef, 0);
	let v = b.insert(tenth, a, 1);
	b.br(header);

	b.switch_to(header);
	let p = b.phi(v2, &[(v, entry)]);
	let i = b.phi(i32_, &[(i0, entry)]);
	let c = b.slt(i, i20);
	b.brc(c, body, exit);

	b.switch_to(body);
	let x = b.extract(p, 0);
	let x1 = b.fadd(x, one);
	let w = b.insert(x1, p, 0);
	let s = b.vtimess(w, k);
	let inext = b.iadd(i, i1);
	b.br(header);
	b.add_incoming(p, s, body);
	b.add_incoming(i, inext, body);

	b.switch_to(exit);
	let o = b.extract(p, 0);
	let res = b.construct(v4, &[o, o, o, o]);
	b.store(out, res);
	b.ret();
	let f = b.finish().unwrap();

	assert_eq!(live(&m, f, v), LaneSet::All);
	check_unchanged(&mut m, f);
}

#[test]
fn dead_phi_cycle_is_removed() {
	let mut m = Module::new();
	let f32_ = m.types.float(32);
	let i32_ = m.types.int(32, true);
	let v2 = m.types.vector(f32_, 2);
	let init = m.add_undef(v2);                            // %1
	let in0 = m.add_variable(f32_, StorageClass::Input);   // %2
	let i0 = m.const_i32(0);                               // %3
	let i1 = m.const_i32(1);                               // %4
	let n = m.const_i32(10);                               // %5

	let mut b = FunctionBuilder::new(&mut m, "main");
	let entry = b.block();
	let header = b.block();
	let body = b.block();
	let exit = b.block();
	b.br(header);

	b.switch_to(header);
	let p = b.phi(v2, &[(init, entry)]);
	let i = b.phi(i32_, &[(i0, entry)]);
	let c = b.slt(i, n);
	b.brc(c, body, exit);

	b.switch_to(body);
	let x = b.load(in0);
	let q = b.insert(x, p, 0);
	let inext = b.iadd(i, i1);
	b.br(header);
	b.add_incoming(p, q, body);
	b.add_incoming(i, inext, body);

	b.switch_to(exit);
	b.ret();
	let f = b.finish().unwrap();

	assert!(live(&m, f, p).is_empty());
	assert!(live(&m, f, q).is_empty());

	check_changed(&mut m, f, &[
		"fn main {",
		"bb0:",
		"    br bb1",
		"bb1:",
		"    %7 = phi i32 %3 bb0 %11 bb2",
		"    %8 = islt bool %7 %5",
		"    brc %8 bb2 bb3",
		"bb2:",
		"    %11 = iadd i32 %7 %4",
		"    br bb1",
		"bb3:",
		"    ret",
		"}",
	]);
}

// ------------------------------------------------------------------------------------------------
// Driver
// ------------------------------------------------------------------------------------------------

#[test]
fn run_module() {
	let (mut m, _) = insert_after_insert();
	let f32_ = m.types.float(32);
	let v2 = m.types.vector(f32_, 2);
	let out = m.add_variable(v2, StorageClass::Output);

	let mut b = FunctionBuilder::new(&mut m, "other");
	b.block();
	let v = b.undef(v2);
	b.store(out, v);
	b.ret();
	let other = b.finish().unwrap();
	let other_before = text(&m, other);

	setup_logging();
	let pass = VectorDce::new();
	assert!(pass.run_module(&mut m));
	assert!(!pass.run_module(&mut m));
	assert_eq!(text(&m, other), other_before);
	assert_eq!(m.funcs().map(|f| f.num_insts()).collect::<Vec<_>>(), vec![5, 3]);
}

#[test]
fn round_limit() {
	let (mut m, f) = insert_after_insert();

	// everything happens in the first round, so it needs a second one to see that it's done.
	assert!(!run_with(&mut m, f, VectorDceConfig::default().max_rounds(0)));
	assert!(run_with(&mut m, f, VectorDceConfig::default().max_rounds(1)));
	assert!(!run_with(&mut m, f, VectorDceConfig::default().max_rounds(1)));
}
