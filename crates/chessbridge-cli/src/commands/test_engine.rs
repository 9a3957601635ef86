//! In-process engine for command tests
//!
//! A direct-return module over three canned positions, bound through a
//! `StaticModule`. State is thread-local, so each test thread gets its own
//! board and no serialization is needed.

use chessbridge_runtime::{symbols, ChessEngine, ModuleAbi, StaticModule, StringReturn};
use std::cell::{Cell, RefCell};
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};

pub const AFTER_E4: &str = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";
pub const MATED: &str = "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3";

struct Canned {
    fen: &'static str,
    legal: &'static str,
    best: &'static str,
    eval: c_int,
    mated: bool,
}

static BOARD: [Canned; 3] = [
    Canned {
        fen: super::START_FEN,
        legal: "e2e4 d2d4 g1f3",
        best: "e2e4",
        eval: 20,
        mated: false,
    },
    Canned {
        fen: AFTER_E4,
        legal: "e7e5 c7c5",
        best: "e7e5",
        eval: -30,
        mated: false,
    },
    Canned {
        fen: MATED,
        legal: "",
        best: "0000",
        eval: -30000,
        mated: true,
    },
];

thread_local! {
    static CURRENT: Cell<usize> = const { Cell::new(0) };
    static DEPTH: Cell<c_int> = const { Cell::new(0) };
    // Keeps the last direct return alive until the next call
    static RETURNED: RefCell<CString> = RefCell::new(CString::default());
}

fn current() -> &'static Canned {
    &BOARD[CURRENT.with(Cell::get)]
}

fn hand_out(text: &str) -> *const c_char {
    RETURNED.with(|slot| {
        *slot.borrow_mut() = CString::new(text).unwrap_or_default();
        slot.borrow().as_ptr()
    })
}

unsafe fn arg(text: *const c_char) -> String {
    CStr::from_ptr(text).to_string_lossy().into_owned()
}

extern "C" fn init() -> c_int {
    CURRENT.with(|c| c.set(0));
    0
}

extern "C" fn cleanup() {}

unsafe extern "C" fn set_position(fen: *const c_char) -> c_int {
    let fen = arg(fen);
    match BOARD.iter().position(|p| p.fen == fen) {
        Some(index) => {
            CURRENT.with(|c| c.set(index));
            0
        }
        None => 1,
    }
}

extern "C" fn get_best_move(depth: c_int) -> *const c_char {
    DEPTH.with(|d| d.set(depth));
    hand_out(current().best)
}

unsafe extern "C" fn make_move(token: *const c_char) -> c_int {
    if CURRENT.with(Cell::get) == 0 && arg(token) == "e2e4" {
        CURRENT.with(|c| c.set(1));
        0
    } else {
        1
    }
}

extern "C" fn undo_move() -> c_int {
    -1
}

extern "C" fn get_legal_moves() -> *const c_char {
    hand_out(current().legal)
}

extern "C" fn is_checkmate() -> c_int {
    current().mated as c_int
}

extern "C" fn is_stalemate() -> c_int {
    0
}

extern "C" fn is_in_check() -> c_int {
    current().mated as c_int
}

extern "C" fn evaluate_position() -> c_int {
    current().eval
}

extern "C" fn get_fen() -> *const c_char {
    hand_out(current().fen)
}

/// Depth passed to the last `get_best_move` on this thread
pub fn last_depth() -> c_int {
    DEPTH.with(Cell::get)
}

/// An initialized engine bound to the canned module
pub fn ready_engine() -> ChessEngine {
    let module = StaticModule::new("canned-engine")
        .with_symbol(symbols::INIT, init as *const ())
        .with_symbol(symbols::CLEANUP, cleanup as *const ())
        .with_symbol(symbols::SET_POSITION, set_position as *const ())
        .with_symbol(symbols::GET_BEST_MOVE, get_best_move as *const ())
        .with_symbol(symbols::MAKE_MOVE, make_move as *const ())
        .with_symbol(symbols::UNDO_MOVE, undo_move as *const ())
        .with_symbol(symbols::GET_LEGAL_MOVES, get_legal_moves as *const ())
        .with_symbol(symbols::IS_CHECKMATE, is_checkmate as *const ())
        .with_symbol(symbols::IS_STALEMATE, is_stalemate as *const ())
        .with_symbol(symbols::IS_IN_CHECK, is_in_check as *const ())
        .with_symbol(symbols::EVALUATE_POSITION, evaluate_position as *const ())
        .with_symbol(symbols::GET_FEN, get_fen as *const ());
    let abi = ModuleAbi {
        string_return: StringReturn::Direct,
        ..ModuleAbi::default()
    };

    let mut engine = ChessEngine::new();
    engine
        .load_with(Box::new(module), &abi)
        .expect("canned module binds");
    engine.init().expect("canned init succeeds");
    engine
}
