//! Symbol binding
//!
//! Resolves every entry point of the engine contract once, casts it to its
//! C signature and fixes the return strategy of each string-returning
//! symbol. A module that is missing anything fails here, before the
//! lifecycle state changes.

use crate::arena::NativeAllocator;
use crate::error::{EngineError, LoadError};
use crate::ffi::module::NativeModule;
use crate::ffi::types::{
    BestMoveBufferFn, BestMoveDirectFn, FlagFn, FreeFn, MallocFn, ScoreFn, StatusFn,
    StringBinding, TextArgFn, TextBufferFn, TextDirectFn, VoidFn, FEN_CAPACITY,
    LEGAL_MOVES_CAPACITY, MOVE_TOKEN_CAPACITY,
};
use chessbridge_config::{ModuleAbi, StringReturn};
use tracing::debug;

/// Contract symbol names, before any manifest prefix
pub mod symbols {
    pub const INIT: &str = "init";
    pub const CLEANUP: &str = "cleanup";
    pub const SET_POSITION: &str = "set_position";
    pub const GET_BEST_MOVE: &str = "get_best_move";
    pub const MAKE_MOVE: &str = "make_move";
    pub const UNDO_MOVE: &str = "undo_move";
    pub const GET_LEGAL_MOVES: &str = "get_legal_moves";
    pub const IS_CHECKMATE: &str = "is_checkmate";
    pub const IS_STALEMATE: &str = "is_stalemate";
    pub const IS_IN_CHECK: &str = "is_in_check";
    pub const EVALUATE_POSITION: &str = "evaluate_position";
    pub const GET_FEN: &str = "get_fen";

    /// Every symbol a module must export, allocator aside
    pub const REQUIRED: [&str; 12] = [
        INIT,
        CLEANUP,
        SET_POSITION,
        GET_BEST_MOVE,
        MAKE_MOVE,
        UNDO_MOVE,
        GET_LEGAL_MOVES,
        IS_CHECKMATE,
        IS_STALEMATE,
        IS_IN_CHECK,
        EVALUATE_POSITION,
        GET_FEN,
    ];
}

/// Typed entry points of one bound module
pub struct EngineBindings {
    pub(crate) init: StatusFn,
    pub(crate) cleanup: VoidFn,
    pub(crate) set_position: TextArgFn,
    pub(crate) get_best_move: StringBinding<BestMoveBufferFn, BestMoveDirectFn>,
    pub(crate) make_move: TextArgFn,
    pub(crate) undo_move: StatusFn,
    pub(crate) get_legal_moves: StringBinding<TextBufferFn, TextDirectFn>,
    pub(crate) is_checkmate: FlagFn,
    pub(crate) is_stalemate: FlagFn,
    pub(crate) is_in_check: FlagFn,
    pub(crate) evaluate_position: ScoreFn,
    pub(crate) get_fen: StringBinding<TextBufferFn, TextDirectFn>,
    pub(crate) allocator: Option<NativeAllocator>,
}

impl EngineBindings {
    /// Strategies chosen for (best move, legal moves, fen)
    pub fn string_strategies(&self) -> [crate::ffi::ReturnStrategy; 3] {
        [
            self.get_best_move.strategy(),
            self.get_legal_moves.strategy(),
            self.get_fen.strategy(),
        ]
    }

    pub fn has_allocator(&self) -> bool {
        self.allocator.is_some()
    }
}

impl std::fmt::Debug for EngineBindings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineBindings")
            .field("get_best_move", &self.get_best_move)
            .field("get_legal_moves", &self.get_legal_moves)
            .field("get_fen", &self.get_fen)
            .field("allocator", &self.allocator.is_some())
            .finish()
    }
}

struct Resolver<'m> {
    module: &'m dyn NativeModule,
    abi: &'m ModuleAbi,
}

impl Resolver<'_> {
    fn lookup(&self, symbol: &str) -> Option<*const ()> {
        self.module
            .resolve(&self.abi.symbol_name(symbol))
            .filter(|address| !address.is_null())
    }

    fn require(&self, symbol: &str) -> Result<*const (), LoadError> {
        self.lookup(symbol).ok_or_else(|| LoadError::SymbolMissing {
            module: self.module.describe(),
            symbol: self.abi.symbol_name(symbol),
        })
    }
}

/// Reinterpret a symbol address as a function pointer of type `F`
///
/// # Safety
///
/// `address` must be the entry point of a function whose ABI matches `F`.
unsafe fn cast<F: Copy>(address: *const ()) -> F {
    debug_assert_eq!(
        std::mem::size_of::<F>(),
        std::mem::size_of::<*const ()>()
    );
    std::mem::transmute_copy(&address)
}

/// Bind every contract symbol of `module`
///
/// Fails with [`LoadError::SymbolMissing`] for an absent entry point and with
/// [`EngineError::DecodingUnavailable`] when buffer returns are configured
/// but the module exports no allocator pair.
pub fn bind_symbols(
    module: &dyn NativeModule,
    abi: &ModuleAbi,
) -> Result<EngineBindings, EngineError> {
    use symbols::*;

    let resolver = Resolver { module, abi };

    let init = resolver.require(INIT)?;
    let cleanup = resolver.require(CLEANUP)?;
    let set_position = resolver.require(SET_POSITION)?;
    let get_best_move = resolver.require(GET_BEST_MOVE)?;
    let make_move = resolver.require(MAKE_MOVE)?;
    let undo_move = resolver.require(UNDO_MOVE)?;
    let get_legal_moves = resolver.require(GET_LEGAL_MOVES)?;
    let is_checkmate = resolver.require(IS_CHECKMATE)?;
    let is_stalemate = resolver.require(IS_STALEMATE)?;
    let is_in_check = resolver.require(IS_IN_CHECK)?;
    let evaluate_position = resolver.require(EVALUATE_POSITION)?;
    let get_fen = resolver.require(GET_FEN)?;

    let allocator = match (resolver.lookup(&abi.malloc), resolver.lookup(&abi.free)) {
        // Safety: allocator symbols follow the C malloc/free signatures
        (Some(malloc), Some(free)) => Some(unsafe {
            NativeAllocator::new(cast::<MallocFn>(malloc), cast::<FreeFn>(free))
        }),
        _ => None,
    };

    if abi.string_return == StringReturn::Buffer && allocator.is_none() {
        return Err(EngineError::DecodingUnavailable {
            symbol: abi.symbol_name(GET_BEST_MOVE),
        });
    }

    // Safety: the module is trusted to export the contract signatures
    let bindings = unsafe {
        let (best_move_binding, legal_moves_binding, fen_binding) = match abi.string_return {
            StringReturn::Buffer => (
                StringBinding::Buffer {
                    func: cast::<BestMoveBufferFn>(get_best_move),
                    capacity: MOVE_TOKEN_CAPACITY,
                },
                StringBinding::Buffer {
                    func: cast::<TextBufferFn>(get_legal_moves),
                    capacity: LEGAL_MOVES_CAPACITY,
                },
                StringBinding::Buffer {
                    func: cast::<TextBufferFn>(get_fen),
                    capacity: FEN_CAPACITY,
                },
            ),
            StringReturn::Direct => (
                StringBinding::Direct {
                    func: cast::<BestMoveDirectFn>(get_best_move),
                    limit: MOVE_TOKEN_CAPACITY,
                },
                StringBinding::Direct {
                    func: cast::<TextDirectFn>(get_legal_moves),
                    limit: LEGAL_MOVES_CAPACITY,
                },
                StringBinding::Direct {
                    func: cast::<TextDirectFn>(get_fen),
                    limit: FEN_CAPACITY,
                },
            ),
        };

        EngineBindings {
            init: cast::<StatusFn>(init),
            cleanup: cast::<VoidFn>(cleanup),
            set_position: cast::<TextArgFn>(set_position),
            get_best_move: best_move_binding,
            make_move: cast::<TextArgFn>(make_move),
            undo_move: cast::<StatusFn>(undo_move),
            get_legal_moves: legal_moves_binding,
            is_checkmate: cast::<FlagFn>(is_checkmate),
            is_stalemate: cast::<FlagFn>(is_stalemate),
            is_in_check: cast::<FlagFn>(is_in_check),
            evaluate_position: cast::<ScoreFn>(evaluate_position),
            get_fen: fen_binding,
            allocator,
        }
    };

    debug!(
        module = %module.describe(),
        strategy = ?abi.string_return,
        allocator = bindings.allocator.is_some(),
        "engine symbols bound"
    );

    Ok(bindings)
}
