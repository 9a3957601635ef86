//! In-process fake engine
//!
//! `extern "C"` functions that honour the engine contract over a handful of
//! canned positions, registered through a `StaticModule`. State is global like
//! a real module's, so tests that use it run under `#[serial]`.

#![allow(dead_code)]

use chessbridge_runtime::ffi::NativeModule;
use chessbridge_runtime::{symbols, ChessEngine, ModuleAbi, StaticModule, StringReturn};
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::sync::{Mutex, MutexGuard};

pub const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
pub const AFTER_E4: &str = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";
pub const FOOLS_MATE: &str = "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3";
pub const STALEMATE: &str = "7k/5Q2/6K1/8/8/8/8/8 b - - 0 1";
pub const ROOK_CHECK: &str = "4k3/8/8/8/8/8/8/4R1K1 b - - 0 1";

pub const START_MOVES: &str = "a2a3 a2a4 b2b3 b2b4 c2c3 c2c4 d2d3 d2d4 e2e3 e2e4 \
    f2f3 f2f4 g2g3 g2g4 h2h3 h2h4 b1a3 b1c3 g1f3 g1h3";
pub const AFTER_E4_MOVES: &str = "a7a6 a7a5 b7b6 b7b5 c7c6 c7c5 d7d6 d7d5 e7e6 e7e5 \
    f7f6 f7f5 g7g6 g7g5 h7h6 h7h5 b8a6 b8c6 g8f6 g8h6";

pub struct Position {
    pub fen: &'static str,
    pub legal: &'static str,
    pub best: &'static str,
    pub eval: c_int,
    pub checkmate: bool,
    pub stalemate: bool,
    pub check: bool,
}

pub static POSITIONS: [Position; 5] = [
    Position {
        fen: START,
        legal: START_MOVES,
        best: "e2e4",
        eval: 20,
        checkmate: false,
        stalemate: false,
        check: false,
    },
    Position {
        fen: AFTER_E4,
        legal: AFTER_E4_MOVES,
        best: "e7e5",
        eval: -30,
        checkmate: false,
        stalemate: false,
        check: false,
    },
    Position {
        fen: FOOLS_MATE,
        legal: "",
        best: "0000",
        eval: -30000,
        checkmate: true,
        stalemate: false,
        check: true,
    },
    Position {
        fen: STALEMATE,
        legal: "",
        best: "0000",
        eval: 0,
        checkmate: false,
        stalemate: true,
        check: false,
    },
    Position {
        fen: ROOK_CHECK,
        legal: "e8d8 e8f8 e8d7 e8f7",
        best: "e8d7",
        eval: -500,
        checkmate: false,
        stalemate: false,
        check: true,
    },
];

static TRANSITIONS: [(&str, &str, &str); 1] = [(START, "e2e4", AFTER_E4)];

#[derive(Default)]
pub struct FakeState {
    pub initialized: bool,
    pub fen: String,
    pub history: Vec<String>,
    pub calls: Vec<&'static str>,
    pub last_depth: Option<c_int>,
    pub allocations: usize,
    pub frees: usize,
    pub init_calls: usize,
    pub cleanup_calls: usize,
    pub fail_init: bool,
    pub fail_alloc: bool,
    /// Buffer writers fill the whole region and never terminate it
    pub unterminated: bool,
    /// Direct writers return null
    pub null_direct: bool,
    /// Bytes left in every fresh scratch region, as if reused
    pub dirty_fill: Option<&'static [u8]>,
    /// Buffer `get_legal_moves` reports this count and writes nothing
    pub reported_moves: Option<c_int>,
    direct: Option<CString>,
}

static STATE: Mutex<Option<FakeState>> = Mutex::new(None);

fn lock() -> MutexGuard<'static, Option<FakeState>> {
    STATE.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn with_state<R>(f: impl FnOnce(&mut FakeState) -> R) -> R {
    let mut guard = lock();
    f(guard.get_or_insert_with(FakeState::default))
}

/// Reset the fake module to a fresh process state
pub fn reset() {
    *lock() = Some(FakeState::default());
}

/// Inspect or tweak the fake module
pub fn fake<R>(f: impl FnOnce(&mut FakeState) -> R) -> R {
    with_state(f)
}

/// Native calls made since the last `reset`, allocator excluded
pub fn calls() -> Vec<&'static str> {
    with_state(|s| s.calls.clone())
}

pub fn clear_calls() {
    with_state(|s| s.calls.clear());
}

fn canonical(fen: &str) -> String {
    fen.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn position(fen: &str) -> Option<&'static Position> {
    POSITIONS.iter().find(|p| p.fen == fen)
}

fn record(symbol: &'static str) {
    with_state(|s| s.calls.push(symbol));
}

fn current() -> Option<&'static Position> {
    with_state(|s| {
        if s.initialized {
            position(&s.fen)
        } else {
            None
        }
    })
}

unsafe fn read_arg(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(str::to_string)
}

/// Write `text` into a host buffer; -1 when it does not fit
unsafe fn write_buffer(text: &str, buf: *mut c_char, cap: c_int) -> c_int {
    let cap = cap.max(0) as usize;
    if with_state(|s| s.unterminated) {
        std::ptr::write_bytes(buf as *mut u8, b'x', cap);
        return 0;
    }
    if text.len() + 1 > cap {
        return -1;
    }
    std::ptr::copy_nonoverlapping(text.as_ptr(), buf as *mut u8, text.len());
    *buf.add(text.len()) = 0;
    0
}

fn direct(text: &str) -> *const c_char {
    with_state(|s| {
        if s.null_direct {
            return std::ptr::null();
        }
        match CString::new(text) {
            Ok(owned) => {
                let ptr = owned.as_ptr();
                s.direct = Some(owned);
                ptr
            }
            Err(_) => std::ptr::null(),
        }
    })
}

extern "C" fn fake_init() -> c_int {
    record("init");
    with_state(|s| {
        s.init_calls += 1;
        if s.fail_init {
            return -1;
        }
        s.initialized = true;
        s.fen = START.to_string();
        s.history.clear();
        0
    })
}

extern "C" fn fake_cleanup() {
    record("cleanup");
    with_state(|s| {
        s.cleanup_calls += 1;
        s.initialized = false;
    });
}

unsafe extern "C" fn fake_set_position(fen: *const c_char) -> c_int {
    record("set_position");
    let Some(fen) = read_arg(fen) else {
        return -1;
    };
    let fen = canonical(&fen);
    with_state(|s| {
        if !s.initialized || position(&fen).is_none() {
            return -1;
        }
        s.fen = fen;
        s.history.clear();
        0
    })
}

unsafe extern "C" fn fake_make_move(token: *const c_char) -> c_int {
    record("make_move");
    let Some(token) = read_arg(token) else {
        return -1;
    };
    with_state(|s| {
        let next = TRANSITIONS
            .iter()
            .find(|(from, mv, _)| *from == s.fen && *mv == token);
        match next {
            Some((_, _, to)) if s.initialized => {
                let previous = std::mem::replace(&mut s.fen, to.to_string());
                s.history.push(previous);
                0
            }
            _ => -1,
        }
    })
}

extern "C" fn fake_undo_move() -> c_int {
    record("undo_move");
    with_state(|s| match s.history.pop() {
        Some(previous) if s.initialized => {
            s.fen = previous;
            0
        }
        _ => -1,
    })
}

unsafe extern "C" fn fake_best_move_buffer(buf: *mut c_char, cap: c_int, depth: c_int) -> c_int {
    record("get_best_move");
    with_state(|s| s.last_depth = Some(depth));
    match current() {
        Some(p) => write_buffer(p.best, buf, cap),
        None => -1,
    }
}

extern "C" fn fake_best_move_direct(depth: c_int) -> *const c_char {
    record("get_best_move");
    with_state(|s| s.last_depth = Some(depth));
    match current() {
        Some(p) => direct(p.best),
        None => std::ptr::null(),
    }
}

unsafe extern "C" fn fake_legal_moves_buffer(buf: *mut c_char, cap: c_int) -> c_int {
    record("get_legal_moves");
    if let Some(count) = with_state(|s| s.reported_moves) {
        return count;
    }
    match current() {
        Some(p) => match write_buffer(p.legal, buf, cap) {
            0 => p.legal.split_whitespace().count() as c_int,
            failed => failed,
        },
        None => -1,
    }
}

extern "C" fn fake_legal_moves_direct() -> *const c_char {
    record("get_legal_moves");
    match current() {
        Some(p) => direct(p.legal),
        None => std::ptr::null(),
    }
}

unsafe extern "C" fn fake_fen_buffer(buf: *mut c_char, cap: c_int) -> c_int {
    record("get_fen");
    match current() {
        Some(p) => write_buffer(p.fen, buf, cap),
        None => -1,
    }
}

extern "C" fn fake_fen_direct() -> *const c_char {
    record("get_fen");
    match current() {
        Some(p) => direct(p.fen),
        None => std::ptr::null(),
    }
}

extern "C" fn fake_is_checkmate() -> c_int {
    record("is_checkmate");
    current().map_or(0, |p| p.checkmate as c_int)
}

extern "C" fn fake_is_stalemate() -> c_int {
    record("is_stalemate");
    current().map_or(0, |p| p.stalemate as c_int)
}

extern "C" fn fake_is_in_check() -> c_int {
    record("is_in_check");
    current().map_or(0, |p| p.check as c_int)
}

extern "C" fn fake_evaluate_position() -> c_int {
    record("evaluate_position");
    current().map_or(0, |p| p.eval)
}

const HEADER: usize = std::mem::size_of::<usize>();

unsafe extern "C" fn fake_malloc(size: usize) -> *mut u8 {
    if with_state(|s| s.fail_alloc) {
        return std::ptr::null_mut();
    }
    with_state(|s| s.allocations += 1);
    let mut region = vec![0u8; size + HEADER].into_boxed_slice();
    region[..HEADER].copy_from_slice(&size.to_ne_bytes());
    if let Some(fill) = with_state(|s| s.dirty_fill) {
        let len = fill.len().min(size);
        region[HEADER..HEADER + len].copy_from_slice(&fill[..len]);
    }
    let base = Box::into_raw(region) as *mut u8;
    base.add(HEADER)
}

unsafe extern "C" fn fake_free(ptr: *mut u8) {
    if ptr.is_null() {
        return;
    }
    with_state(|s| s.frees += 1);
    let base = ptr.sub(HEADER);
    let mut size_bytes = [0u8; HEADER];
    std::ptr::copy_nonoverlapping(base, size_bytes.as_mut_ptr(), HEADER);
    let size = usize::from_ne_bytes(size_bytes);
    drop(Box::from_raw(std::ptr::slice_from_raw_parts_mut(base, size + HEADER)));
}

/// Export table of the fake engine for the given string strategy
pub fn fake_table(strategy: StringReturn) -> StaticModule {
    let (best_move, legal_moves, fen) = match strategy {
        StringReturn::Buffer => (
            fake_best_move_buffer as *const (),
            fake_legal_moves_buffer as *const (),
            fake_fen_buffer as *const (),
        ),
        StringReturn::Direct => (
            fake_best_move_direct as *const (),
            fake_legal_moves_direct as *const (),
            fake_fen_direct as *const (),
        ),
    };

    StaticModule::new("fake-engine")
        .with_symbol(symbols::INIT, fake_init as *const ())
        .with_symbol(symbols::CLEANUP, fake_cleanup as *const ())
        .with_symbol(symbols::SET_POSITION, fake_set_position as *const ())
        .with_symbol(symbols::GET_BEST_MOVE, best_move)
        .with_symbol(symbols::MAKE_MOVE, fake_make_move as *const ())
        .with_symbol(symbols::UNDO_MOVE, fake_undo_move as *const ())
        .with_symbol(symbols::GET_LEGAL_MOVES, legal_moves)
        .with_symbol(symbols::IS_CHECKMATE, fake_is_checkmate as *const ())
        .with_symbol(symbols::IS_STALEMATE, fake_is_stalemate as *const ())
        .with_symbol(symbols::IS_IN_CHECK, fake_is_in_check as *const ())
        .with_symbol(symbols::EVALUATE_POSITION, fake_evaluate_position as *const ())
        .with_symbol(symbols::GET_FEN, fen)
        .with_symbol("malloc", fake_malloc as *const ())
        .with_symbol("free", fake_free as *const ())
}

pub fn fake_abi(strategy: StringReturn) -> ModuleAbi {
    ModuleAbi {
        string_return: strategy,
        ..ModuleAbi::default()
    }
}

/// A freshly reset fake module, loaded but not initialized
pub fn loaded_engine(strategy: StringReturn) -> ChessEngine {
    reset();
    let mut engine = ChessEngine::new();
    let module: Box<dyn NativeModule + Send> = Box::new(fake_table(strategy));
    engine
        .load_with(module, &fake_abi(strategy))
        .expect("fake module binds");
    engine
}

/// A freshly reset fake module, initialized at the start position
pub fn ready_engine(strategy: StringReturn) -> ChessEngine {
    let mut engine = loaded_engine(strategy);
    engine.init().expect("fake init succeeds");
    clear_calls();
    engine
}
