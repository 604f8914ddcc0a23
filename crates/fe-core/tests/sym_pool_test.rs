use fe_core::memory::compact_map::fast_map_with_capacity;
use fe_core::{PoolConfig, Sym, SymMap, SymMapExt, SymPool, SymSet, INLINE_CAPACITY};

#[test]
fn test_equal_content_gives_equal_handles() {
    let pool = SymPool::new();
    let words = ["x", "count", "identifier", "another_identifier", "λx.x", "identifier"];
    let syms: Vec<Sym<'_>> = words.iter().map(|w| pool.sym(w)).collect();

    for (i, a) in words.iter().enumerate() {
        for (j, b) in words.iter().enumerate() {
            assert_eq!(syms[i] == syms[j], a == b, "{a:?} vs {b:?}");
            assert_eq!(syms[i].to_bits() == syms[j].to_bits(), a == b);
        }
    }
    assert_eq!(pool.sym_string("identifier".to_string()), syms[2]);
}

#[cfg(target_pointer_width = "64")]
#[test]
fn test_inline_boxed_boundary() {
    assert_eq!(INLINE_CAPACITY, 6);

    let pool = SymPool::new();
    let six = pool.sym("abcdef");
    assert!(six.is_inline());
    assert_eq!(pool.stats().pages, 0);

    let seven = pool.sym("abcdefg");
    assert!(seven.is_boxed());
    assert_eq!(pool.stats().pages, 1);
    assert_eq!(pool.len(), 1);
}

#[test]
fn test_empty_identity() {
    let pool = SymPool::new();
    let candidates = [pool.sym(""), pool.sym_cstr(None), pool.sym_cstr(Some(c"")), Sym::default()];
    for s in candidates {
        assert_eq!(s, Sym::EMPTY);
        assert_eq!(s.to_bits(), 0);
        assert!(s.is_empty());
        assert_eq!(s.as_str(), "");
    }
    assert!(pool.is_empty());
}

#[test]
fn test_repeated_interning_commits_one_record() {
    let pool = SymPool::new();
    let text = "this_is_definitely_too_long_for_inline";
    pool.sym(text);
    let once = pool.stats().committed_bytes;

    for _ in 0..1000 {
        pool.sym(text);
    }
    let stats = pool.stats();
    assert_eq!(pool.len(), 1);
    assert_eq!(stats.committed_bytes, once);
    // header word + content + NUL
    assert_eq!(once, std::mem::size_of::<usize>() + text.len() + 1);
}

#[test]
fn test_pool_spills_onto_new_pages() {
    let pool = SymPool::with_config(&PoolConfig {
        page_size: 64,
        initial_capacity: 16,
    });
    let owned: Vec<String> = (0..50).map(|i| format!("long_symbol_number_{i}")).collect();
    let syms: Vec<_> = owned.iter().map(|s| pool.sym(s)).collect();

    assert_eq!(pool.len(), 50);
    assert!(pool.stats().pages > 1);
    for (s, text) in syms.iter().zip(&owned) {
        assert_eq!(s.as_str(), text);
        assert_eq!(pool.sym(text), *s);
    }
    assert_eq!(pool.len(), 50);
}

#[test]
fn test_char_ordering() {
    let pool = SymPool::new();
    let b = pool.sym("b");
    let bc = pool.sym("bc");
    assert!(b == 'b');
    assert!(b < 'c');
    assert!(bc > 'b');
    assert!(pool.sym("a_long_name_starting_with_a") < 'b');
}

#[test]
fn test_iteration() {
    let pool = SymPool::new();
    for text in ["xyz", "xyz_but_boxed_z"] {
        let s = pool.sym(text);
        let forward: String = s.chars().collect();
        let backward: String = s.chars().rev().collect();
        assert_eq!(forward, text);
        assert_eq!(backward, text.chars().rev().collect::<String>());
        assert_eq!(s.front(), Some('x'));
        assert_eq!(s.back(), Some('z'));
        assert_eq!(s.len(), text.len());
        assert_eq!(s.bytes().count(), text.len());
    }
    let s = pool.sym("xyz");
    assert_eq!(s.chars().collect::<Vec<_>>(), ['x', 'y', 'z']);
    assert_eq!(s.chars().rev().collect::<Vec<_>>(), ['z', 'y', 'x']);
}

#[test]
fn test_content_ordering_mixes_representations() {
    let pool = SymPool::new();
    let mut syms = vec![
        pool.sym("zeta_function"),
        pool.sym("alpha"),
        pool.sym("alphabet_soup"),
        pool.sym(""),
        pool.sym("m"),
    ];
    syms.sort();
    let sorted: Vec<&str> = syms.iter().map(Sym::as_str).collect();
    assert_eq!(sorted, ["", "alpha", "alphabet_soup", "m", "zeta_function"]);
}

#[test]
fn test_symbols_as_map_keys() {
    let pool = SymPool::new();
    let mut arity: SymMap<'_, usize> = fast_map_with_capacity(8);
    arity.insert(pool.sym("print"), 1);
    arity.insert(pool.sym("fold_left_with_index"), 3);

    assert_eq!(arity.get(&pool.sym("print")), Some(&1));
    assert_eq!(arity.get_str(&pool, "fold_left_with_index"), Some(&3));
    assert_eq!(arity.get_str(&pool, "never_interned_name"), None);
    // probing does not intern
    assert_eq!(pool.len(), 1);

    let mut seen = SymSet::default();
    assert!(seen.insert(pool.sym("print")));
    assert!(!seen.insert(pool.sym("print")));
}

#[test]
fn test_display_serialize_and_c_str() {
    let pool = SymPool::new();
    let s = pool.sym("with_a_nul_terminator");
    assert_eq!(format!("<{s}>"), "<with_a_nul_terminator>");
    assert_eq!(s.as_c_str().to_str().unwrap(), "with_a_nul_terminator");
    assert_eq!(serde_json::to_string(&[s, pool.sym("id")]).unwrap(), r#"["with_a_nul_terminator","id"]"#);

    let stats = serde_json::to_value(pool.stats()).unwrap();
    assert_eq!(stats["records"], 1);
}

#[test]
fn test_pool_can_move_to_another_thread() {
    let pool = SymPool::new();
    let bits = pool.sym("sent_across_threads").to_bits();
    let handle = std::thread::spawn(move || {
        let again = pool.sym("sent_across_threads");
        (again.to_bits(), pool.len())
    });
    assert_eq!(handle.join().unwrap(), (bits, 1));
}

#[test]
fn test_c_strings_intern_by_bytes() {
    let pool = SymPool::new();
    let latin1 = [c"caf\xe9_latin1", c"caf\xe8_latin1", c"caf\xe9_latin1"].map(|c| pool.sym_cstr(Some(c)));
    assert_ne!(latin1[0], latin1[1]);
    assert_eq!(latin1[0], latin1[2]);
    assert_eq!(pool.len(), 2);
    assert!(!latin1[0].is_utf8());

    let short = [c"\xff", c"\xfe"].map(|c| pool.sym_cstr(Some(c)));
    assert!(short[0].is_inline());
    assert_ne!(short[0], short[1]);
    assert_eq!(short[0].as_bytes(), b"\xff");

    assert_eq!(pool.sym_cstr(Some(c"plain_c_identifier")), pool.sym("plain_c_identifier"));
}
