//! End-to-end solidification tests over the public API.
//!
//! Each test builds a small object graph the way the compiler would and
//! checks the emitted constructor text for the forms the C runtime keys
//! on.

use beryl_core::class::{Class, ClassKind, Instance};
use beryl_core::code::{encode_abc, encode_abx};
use beryl_core::map::{Map, MapKey};
use beryl_core::proto::{Proto, UpvalDesc, VarargFlags};
use beryl_core::value::{Closure, Value};
use beryl_core::{builtins, Module, Opcode};
use beryl_solidify::{DumpOptions, SolidifyError, dump, dump_to_string};
use std::rc::Rc;

fn closure_value(proto: Proto) -> Value {
    Value::Closure(Rc::new(Closure::new(Rc::new(proto))))
}

fn method(name: &str, class: &Rc<Class>) -> Rc<Closure> {
    let mut proto = Proto::new(name);
    proto.varg = VarargFlags::METHOD;
    proto.parent_class = Some(Rc::downgrade(class));
    proto.code = vec![encode_abc(Opcode::Ret, 0, 0, 0)];
    Rc::new(Closure::new(Rc::new(proto)))
}

#[test]
fn test_simple_closure_layout() {
    let mut proto = Proto::new("f");
    proto.nstack = 2;
    proto.argc = 1;
    proto.consts = vec![Value::Int(42), Value::str("hello")];
    proto.code = vec![0x8000_0001, 0x0000_0000];

    let out = dump_to_string(&closure_value(proto), &DumpOptions::new()).unwrap();

    assert!(out.contains("be_local_closure(f,"), "output:\n{}", out);
    assert!(out.contains("/* K0 */ be_const_int(42)"), "output:\n{}", out);
    assert!(out.contains("/* K1 */ be_nested_str(hello)"), "output:\n{}", out);
    assert!(out.contains("0x80000001,"));
    assert!(out.contains("&be_const_str_solidified"));
}

#[test]
fn test_class_forward_declaration_precedes_method() {
    let class = Rc::new(Class::new("A", 0, ClassKind::User));
    let m = method("m", &class);
    let mut members = Map::new();
    members.insert(MapKey::str("m"), Value::Closure(m));
    class.set_members(members);

    let out = dump_to_string(&Value::Class(class), &DumpOptions::new()).unwrap();

    let fwd = out.find("extern const bclass be_class_A;").expect("forward decl");
    let body = out.find("be_local_closure(class_A_m,").expect("method body");
    assert!(fwd < body, "forward declaration must precede the method:\n{}", out);
    assert!(out.contains("be_const_closure(class_A_m_closure)"));
    assert!(out.contains("be_local_class(A,"));
}

#[test]
fn test_borrowed_method_is_declared_not_defined() {
    let owner = Rc::new(Class::new("B", 0, ClassKind::User));
    let class = Rc::new(Class::new("A", 0, ClassKind::User));
    let m = method("m", &owner);
    let mut members = Map::new();
    members.insert(MapKey::str("m"), Value::Closure(m));
    class.set_members(members);

    let out = dump_to_string(&Value::Class(class), &DumpOptions::new()).unwrap();

    assert!(out.contains("// Borrowed method 'm' from class 'B'"), "output:\n{}", out);
    assert!(out.contains("extern bclosure *class_B_m;"));
    assert!(!out.contains("be_local_closure(class_B_m,"));
    // The member map still references the foreign symbol
    assert!(out.contains("be_const_closure(class_B_m_closure)"));
}

#[test]
fn test_borrow_detection_is_symmetric() {
    // The same closure emits fully when dumped under its owning scope
    let owner = Rc::new(Class::new("B", 0, ClassKind::User));
    let m = method("m", &owner);

    let options = DumpOptions::new().with_prefix("class_B");
    let out = dump_to_string(&Value::Closure(m), &options).unwrap();
    assert!(out.contains("be_local_closure(class_B_m,"), "output:\n{}", out);
    assert!(!out.contains("Borrowed method"));
}

#[test]
fn test_map_keys_and_identifier_escapes() {
    let mut data = Map::new();
    data.insert(MapKey::str("k_X"), Value::Int(1));
    data.insert(MapKey::Int(7), Value::str("v?"));

    let module = Module::new("demo");
    module.insert("data", Value::map(data));

    let out = dump_to_string(&Value::Module(Rc::new(module)), &DumpOptions::new()).unwrap();

    assert!(out.contains("be_const_key(k_X_,"), "output:\n{}", out);
    assert!(out.contains("be_const_key_int(7,"), "output:\n{}", out);
    assert!(out.contains("be_nested_str(v_X3F)"), "output:\n{}", out);
}

#[test]
fn test_bytes_instance_hex_dump() {
    let mut proto = Proto::new("payload");
    proto.consts = vec![Value::Instance(Instance::bytes(vec![0xDE, 0xAD, 0xBE, 0xEF]))];
    proto.code = vec![encode_abx(Opcode::Ldconst, 0, 0)];

    let out = dump_to_string(&closure_value(proto), &DumpOptions::new()).unwrap();
    assert!(out.contains("be_const_bytes_instance(DEADBEEF)"), "output:\n{}", out);
}

#[test]
fn test_non_builtin_global_aborts() {
    let mut proto = Proto::new("g");
    proto.code = vec![encode_abx(
        Opcode::Getgbl,
        0,
        (builtins::count() + 1) as u32,
    )];

    match dump_to_string(&closure_value(proto), &DumpOptions::new()) {
        Err(SolidifyError::Internal(msg)) => {
            assert!(msg.contains("non-builtin global"), "message: {}", msg);
        }
        other => panic!("expected internal error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_builtin_global_in_range_is_accepted() {
    let mut proto = Proto::new("p");
    proto.code = vec![encode_abx(Opcode::Getgbl, 0, 1)];
    let out = dump_to_string(&closure_value(proto), &DumpOptions::new()).unwrap();
    assert!(out.contains("GETGBL"), "output:\n{}", out);
}

#[test]
fn test_sub_prototype_table_arity() {
    let mut inner_a = Proto::new("inner_a");
    inner_a.code = vec![encode_abc(Opcode::Ret, 0, 0, 0)];
    let mut inner_b = Proto::new("");
    inner_b.code = vec![encode_abc(Opcode::Ret, 0, 0, 0)];

    let mut proto = Proto::new("outer");
    proto.protos = vec![Rc::new(inner_a), Rc::new(inner_b)];
    proto.code = vec![encode_abx(Opcode::Closure, 0, 0)];

    let out = dump_to_string(&closure_value(proto), &DumpOptions::new()).unwrap();

    // Two sub-prototypes emit a 3-slot table, trailing parent slot NULL
    assert!(out.contains("bproto*[ 3]"), "output:\n{}", out);
    assert!(out.contains("NULL,  /* no parent class */"));
    // The anonymous nested function is named from its position
    assert!(out.contains("&be_const_str_outer_1"), "output:\n{}", out);
}

#[test]
fn test_upvalue_marker_is_soft() {
    let mut proto = Proto::new("cb");
    proto.upvals = vec![UpvalDesc {
        instack: true,
        idx: 0,
    }];
    proto.code = vec![encode_abc(Opcode::Ret, 0, 0, 0)];
    let mut closure = Closure::new(Rc::new(proto));
    closure.nupvals = 1;

    let out = dump_to_string(&Value::Closure(Rc::new(closure)), &DumpOptions::new()).unwrap();

    // Marked as unsupported, but emission continues to the full body
    assert!(out.contains("--> Unsupported upvals in closure <---"));
    assert!(out.contains("be_local_closure(cb,"));
    assert!(out.contains("be_local_const_upval(1, 0)"));
}

#[test]
fn test_literal_mode_selects_weak_family() {
    let class = Rc::new(Class::new("Timer", 1, ClassKind::User));
    let mut members = Map::new();
    members.insert(MapKey::str("period"), Value::str("ms"));
    class.set_members(members);

    let options = DumpOptions::new().with_literal_strings(true);
    let out = dump_to_string(&Value::Class(class), &options).unwrap();

    assert!(out.contains("be_const_key_weak(period,"), "output:\n{}", out);
    assert!(out.contains("be_nested_str_weak(ms)"));
    assert!(out.contains("be_str_weak(Timer)"));
    assert!(!out.contains("&be_const_str_Timer"));
}

#[test]
fn test_long_string_takes_raw_path() {
    let long = "x".repeat(1600);
    let mut proto = Proto::new("big");
    proto.consts = vec![Value::str(&long)];
    proto.code = vec![encode_abx(Opcode::Ldconst, 0, 0)];

    let out = dump_to_string(&closure_value(proto), &DumpOptions::new()).unwrap();

    // Longer than the formatted line buffer, emitted without truncation
    assert!(out.contains(&format!("be_nested_str_long({})", long)), "long constant truncated");
}

#[test]
fn test_simple_instance_wrappers() {
    let mut inner = Map::new();
    inner.insert(MapKey::str("unit"), Value::str("C"));

    let module = Module::new("env");
    module.insert("defaults", Value::Instance(Instance::simple_map(inner)));

    let out = dump_to_string(&Value::Module(Rc::new(module)), &DumpOptions::new()).unwrap();

    assert!(out.contains("be_const_simple_instance(be_nested_simple_instance(&be_class_map, {"));
    assert!(out.contains("be_const_map( * be_nested_map("), "output:\n{}", out);
}

#[test]
fn test_user_instance_is_rejected() {
    let class = Rc::new(Class::new("Sensor", 1, ClassKind::User));
    let instance = Rc::new(Instance {
        class,
        super_: None,
        sub: None,
        members: vec![Value::Nil],
    });
    let mut proto = Proto::new("f");
    proto.consts = vec![Value::Instance(instance)];
    proto.code = vec![encode_abx(Opcode::Ldconst, 0, 0)];

    match dump_to_string(&closure_value(proto), &DumpOptions::new()) {
        Err(SolidifyError::Internal(msg)) => {
            assert!(msg.contains("unsupported class"), "message: {}", msg);
        }
        other => panic!("expected internal error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_whole_module_emission() {
    let class = Rc::new(Class::new("Rule", 2, ClassKind::User));
    let init = method("init", &class);
    let mut members = Map::new();
    members.insert(MapKey::str("init"), Value::Closure(init));
    class.set_members(members);

    let mut top = Proto::new("run");
    top.code = vec![encode_abc(Opcode::Ret, 0, 0, 0)];

    let module = Module::new("automation");
    module.insert("VERSION", Value::Int(3));
    module.insert("run", closure_value(top));
    module.insert("Rule", Value::Class(class));

    let out = dump_to_string(&Value::Module(Rc::new(module)), &DumpOptions::new()).unwrap();

    // Members are all defined before the module table references them
    let table = out.find("be_local_module(automation,").expect("module form");
    assert!(out.find("be_local_closure(run,").expect("top closure") < table);
    assert!(out.find("be_local_class(Rule,").expect("class") < table);
    assert!(out.find("be_local_closure(class_Rule_init,").expect("method") < table);
    assert!(out.contains("\"automation\""));
    assert!(out.contains("be_const_int(3)"));
    assert!(out.contains(
        "BE_EXPORT_VARIABLE be_define_const_native_module(automation);"
    ));
}

#[test]
fn test_shared_class_constant_is_defined_once() {
    // One helper class referenced from the constant tables of two
    // methods: the definition must appear exactly once on the sink.
    let helper = Rc::new(Class::new("Helper", 0, ClassKind::User));
    let class = Rc::new(Class::new("Foo", 0, ClassKind::User));

    let mut members = Map::new();
    for name in ["a", "b"] {
        let mut proto = Proto::new(name);
        proto.varg = VarargFlags::METHOD;
        proto.parent_class = Some(Rc::downgrade(&class));
        proto.consts = vec![Value::Class(helper.clone())];
        proto.code = vec![encode_abx(Opcode::Ldconst, 0, 0)];
        members.insert(
            MapKey::str(name),
            Value::Closure(Rc::new(Closure::new(Rc::new(proto)))),
        );
    }
    class.set_members(members);

    let out = dump_to_string(&Value::Class(class), &DumpOptions::new()).unwrap();

    assert_eq!(
        out.matches("be_local_class(Helper,").count(),
        1,
        "output:\n{}",
        out
    );
    assert_eq!(
        out.matches("extern const bclass be_class_Helper;").count(),
        1
    );
    // Both methods still reference the one shared definition
    assert_eq!(out.matches("be_const_class(be_class_Helper)").count(), 2);
}

#[test]
fn test_native_members_are_named_from_scope_and_key() {
    let class = Rc::new(Class::new("Clock", 0, ClassKind::User));
    let mut members = Map::new();
    members.insert(MapKey::str("now"), Value::NativeFunc { is_static: false });
    members.insert(MapKey::str("tick"), Value::NativeFunc { is_static: true });
    members.insert(
        MapKey::str("impl"),
        Value::NativePtr(beryl_core::NativePayload::Opaque),
    );
    class.set_members(members);

    let out = dump_to_string(&Value::Class(class), &DumpOptions::new()).unwrap();

    assert!(out.contains("be_const_func(be_ntv_class_Clock_now)"), "output:\n{}", out);
    assert!(out.contains("be_const_static_func(be_ntv_class_Clock_tick)"));
    assert!(out.contains("be_const_comptr(&be_ntv_class_Clock_impl)"));
}

#[test]
fn test_module_inside_constants_is_rejected() {
    let mut proto = Proto::new("f");
    proto.consts = vec![Value::Module(Rc::new(Module::new("inner")))];
    proto.code = vec![encode_abx(Opcode::Ldconst, 0, 0)];

    match dump_to_string(&closure_value(proto), &DumpOptions::new()) {
        Err(SolidifyError::Internal(msg)) => {
            assert!(msg.contains("unsupported type in constants"), "message: {}", msg);
        }
        other => panic!("expected internal error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_dump_to_caller_owned_file() {
    let mut proto = Proto::new("f");
    proto.code = vec![encode_abc(Opcode::Ret, 0, 0, 0)];
    let value = closure_value(proto);

    let mut file = tempfile::tempfile().unwrap();
    dump(&value, &DumpOptions::new(), &mut file).unwrap();

    use std::io::{Read, Seek, SeekFrom};
    let mut text = String::new();
    file.seek(SeekFrom::Start(0)).unwrap();
    file.read_to_string(&mut text).unwrap();
    assert!(text.contains("be_local_closure(f,"));
}

#[test]
fn test_real_emits_exact_bit_pattern() {
    let mut proto = Proto::new("f");
    proto.consts = vec![Value::Real(1.5), Value::Bool(true)];
    proto.code = vec![encode_abx(Opcode::Ldconst, 0, 0)];

    let out = dump_to_string(&closure_value(proto), &DumpOptions::new()).unwrap();

    #[cfg(not(feature = "single-float"))]
    assert!(out.contains("be_const_real_hex(0x3FF8000000000000)"), "output:\n{}", out);
    #[cfg(feature = "single-float")]
    assert!(out.contains("be_const_real_hex(0x3FC00000)"), "output:\n{}", out);
    assert!(out.contains("be_const_bool(1)"));
}
