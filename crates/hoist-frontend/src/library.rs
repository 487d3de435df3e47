//! Predeclared binary types.
//!
//! Library types have no source (`Symbol::decl` is `None`), so the
//! refactoring core treats them as binary: they can be referenced but
//! never edited. Only the members sources commonly touch are declared.

use hoist_model::{ModifierFlags, Symbol, SymbolId, SymbolKind, SymbolTable, TypeKind};

struct LibraryMember {
    name: &'static str,
    kind: SymbolKind,
    params: &'static [&'static str],
    is_static: bool,
    /// Simple name of a `java.lang` or same-package type.
    value_type: Option<&'static str>,
}

const fn method(name: &'static str, params: &'static [&'static str], value_type: Option<&'static str>) -> LibraryMember {
    LibraryMember {
        name,
        kind: SymbolKind::Method,
        params,
        is_static: false,
        value_type,
    }
}

const fn static_method(
    name: &'static str,
    params: &'static [&'static str],
    value_type: Option<&'static str>,
) -> LibraryMember {
    LibraryMember {
        is_static: true,
        ..method(name, params, value_type)
    }
}

const fn static_field(name: &'static str, value_type: &'static str) -> LibraryMember {
    LibraryMember {
        name,
        kind: SymbolKind::Field,
        params: &[],
        is_static: true,
        value_type: Some(value_type),
    }
}

const fn constructor(params: &'static [&'static str]) -> LibraryMember {
    LibraryMember {
        name: "<init>",
        kind: SymbolKind::Constructor,
        params,
        is_static: false,
        value_type: None,
    }
}

struct LibraryType {
    package: &'static str,
    name: &'static str,
    kind: TypeKind,
    superclass: Option<&'static str>,
    interfaces: &'static [&'static str],
    type_params: &'static [&'static str],
    members: &'static [LibraryMember],
}

const OBJECT_MEMBERS: &[LibraryMember] = &[
    constructor(&[]),
    method("toString", &[], Some("String")),
    method("equals", &["Object"], None),
    method("hashCode", &[], None),
    method("getClass", &[], None),
];

const THROWABLE_MEMBERS: &[LibraryMember] = &[
    constructor(&[]),
    constructor(&["String"]),
    method("getMessage", &[], Some("String")),
];

const LIBRARY: &[LibraryType] = &[
    LibraryType {
        package: "java.lang",
        name: "Object",
        kind: TypeKind::Class,
        superclass: None,
        interfaces: &[],
        type_params: &[],
        members: OBJECT_MEMBERS,
    },
    LibraryType {
        package: "java.lang",
        name: "String",
        kind: TypeKind::Class,
        superclass: Some("Object"),
        interfaces: &["Comparable"],
        type_params: &[],
        members: &[
            method("length", &[], None),
            method("isEmpty", &[], None),
            method("charAt", &["int"], None),
            method("substring", &["int"], Some("String")),
            method("trim", &[], Some("String")),
            static_method("valueOf", &["Object"], Some("String")),
            static_method("format", &["String", "Object..."], Some("String")),
        ],
    },
    LibraryType {
        package: "java.lang",
        name: "Integer",
        kind: TypeKind::Class,
        superclass: Some("Object"),
        interfaces: &["Comparable"],
        type_params: &[],
        members: &[
            static_method("parseInt", &["String"], None),
            static_method("valueOf", &["int"], Some("Integer")),
            method("intValue", &[], None),
            static_field("MAX_VALUE", "Integer"),
            static_field("MIN_VALUE", "Integer"),
        ],
    },
    LibraryType {
        package: "java.lang",
        name: "Long",
        kind: TypeKind::Class,
        superclass: Some("Object"),
        interfaces: &["Comparable"],
        type_params: &[],
        members: &[static_method("valueOf", &["long"], Some("Long"))],
    },
    LibraryType {
        package: "java.lang",
        name: "Boolean",
        kind: TypeKind::Class,
        superclass: Some("Object"),
        interfaces: &[],
        type_params: &[],
        members: &[static_method("valueOf", &["boolean"], Some("Boolean"))],
    },
    LibraryType {
        package: "java.lang",
        name: "Double",
        kind: TypeKind::Class,
        superclass: Some("Object"),
        interfaces: &["Comparable"],
        type_params: &[],
        members: &[static_method("valueOf", &["double"], Some("Double"))],
    },
    LibraryType {
        package: "java.lang",
        name: "Character",
        kind: TypeKind::Class,
        superclass: Some("Object"),
        interfaces: &[],
        type_params: &[],
        members: &[static_method("isDigit", &["char"], None)],
    },
    LibraryType {
        package: "java.lang",
        name: "Math",
        kind: TypeKind::Class,
        superclass: Some("Object"),
        interfaces: &[],
        type_params: &[],
        members: &[
            static_method("max", &["int", "int"], None),
            static_method("min", &["int", "int"], None),
            static_method("abs", &["int"], None),
            static_field("PI", "Double"),
        ],
    },
    LibraryType {
        package: "java.lang",
        name: "System",
        kind: TypeKind::Class,
        superclass: Some("Object"),
        interfaces: &[],
        type_params: &[],
        members: &[
            static_field("out", "PrintStream"),
            static_field("err", "PrintStream"),
            static_method("currentTimeMillis", &[], None),
        ],
    },
    LibraryType {
        package: "java.lang",
        name: "Runnable",
        kind: TypeKind::Interface,
        superclass: None,
        interfaces: &[],
        type_params: &[],
        members: &[method("run", &[], None)],
    },
    LibraryType {
        package: "java.lang",
        name: "Comparable",
        kind: TypeKind::Interface,
        superclass: None,
        interfaces: &[],
        type_params: &["T"],
        members: &[method("compareTo", &["T"], None)],
    },
    LibraryType {
        package: "java.lang",
        name: "Iterable",
        kind: TypeKind::Interface,
        superclass: None,
        interfaces: &[],
        type_params: &["T"],
        members: &[method("iterator", &[], None)],
    },
    LibraryType {
        package: "java.lang",
        name: "Throwable",
        kind: TypeKind::Class,
        superclass: Some("Object"),
        interfaces: &[],
        type_params: &[],
        members: THROWABLE_MEMBERS,
    },
    LibraryType {
        package: "java.lang",
        name: "Exception",
        kind: TypeKind::Class,
        superclass: Some("Throwable"),
        interfaces: &[],
        type_params: &[],
        members: THROWABLE_MEMBERS,
    },
    LibraryType {
        package: "java.lang",
        name: "RuntimeException",
        kind: TypeKind::Class,
        superclass: Some("Exception"),
        interfaces: &[],
        type_params: &[],
        members: THROWABLE_MEMBERS,
    },
    LibraryType {
        package: "java.lang",
        name: "IllegalArgumentException",
        kind: TypeKind::Class,
        superclass: Some("RuntimeException"),
        interfaces: &[],
        type_params: &[],
        members: THROWABLE_MEMBERS,
    },
    LibraryType {
        package: "java.lang",
        name: "IllegalStateException",
        kind: TypeKind::Class,
        superclass: Some("RuntimeException"),
        interfaces: &[],
        type_params: &[],
        members: THROWABLE_MEMBERS,
    },
    LibraryType {
        package: "java.lang",
        name: "StringBuilder",
        kind: TypeKind::Class,
        superclass: Some("Object"),
        interfaces: &[],
        type_params: &[],
        members: &[
            constructor(&[]),
            constructor(&["String"]),
            method("append", &["Object"], Some("StringBuilder")),
            method("toString", &[], Some("String")),
        ],
    },
    LibraryType {
        package: "java.lang",
        name: "Thread",
        kind: TypeKind::Class,
        superclass: Some("Object"),
        interfaces: &["Runnable"],
        type_params: &[],
        members: &[
            constructor(&[]),
            constructor(&["Runnable"]),
            method("start", &[], None),
            method("run", &[], None),
        ],
    },
    LibraryType {
        package: "java.lang",
        name: "Override",
        kind: TypeKind::Annotation,
        superclass: None,
        interfaces: &[],
        type_params: &[],
        members: &[],
    },
    LibraryType {
        package: "java.lang",
        name: "Deprecated",
        kind: TypeKind::Annotation,
        superclass: None,
        interfaces: &[],
        type_params: &[],
        members: &[],
    },
    LibraryType {
        package: "java.lang",
        name: "SuppressWarnings",
        kind: TypeKind::Annotation,
        superclass: None,
        interfaces: &[],
        type_params: &[],
        members: &[],
    },
    LibraryType {
        package: "java.io",
        name: "PrintStream",
        kind: TypeKind::Class,
        superclass: Some("Object"),
        interfaces: &[],
        type_params: &[],
        members: &[
            method("println", &["Object"], None),
            method("print", &["Object"], None),
        ],
    },
    LibraryType {
        package: "java.util",
        name: "Collection",
        kind: TypeKind::Interface,
        superclass: None,
        interfaces: &["Iterable"],
        type_params: &["E"],
        members: &[
            method("size", &[], None),
            method("isEmpty", &[], None),
            method("add", &["E"], None),
            method("contains", &["Object"], None),
        ],
    },
    LibraryType {
        package: "java.util",
        name: "List",
        kind: TypeKind::Interface,
        superclass: None,
        interfaces: &["Collection"],
        type_params: &["E"],
        members: &[method("get", &["int"], None)],
    },
    LibraryType {
        package: "java.util",
        name: "ArrayList",
        kind: TypeKind::Class,
        superclass: Some("Object"),
        interfaces: &["List"],
        type_params: &["E"],
        members: &[constructor(&[]), constructor(&["int"])],
    },
    LibraryType {
        package: "java.util",
        name: "Map",
        kind: TypeKind::Interface,
        superclass: None,
        interfaces: &[],
        type_params: &["K", "V"],
        members: &[
            method("get", &["Object"], None),
            method("put", &["K", "V"], None),
            method("containsKey", &["Object"], None),
            method("size", &[], None),
        ],
    },
    LibraryType {
        package: "java.util",
        name: "HashMap",
        kind: TypeKind::Class,
        superclass: Some("Object"),
        interfaces: &["Map"],
        type_params: &["K", "V"],
        members: &[constructor(&[])],
    },
];

/// Declare the library types into `symbols`. Returns the id of
/// `java.lang.Object`, the implicit superclass of source classes.
pub fn declare_library(symbols: &mut SymbolTable) -> SymbolId {
    let ids: Vec<SymbolId> = LIBRARY
        .iter()
        .map(|lib| {
            let mut symbol = Symbol::new(lib.name, SymbolKind::Type(lib.kind), lib.package);
            symbol.flags = ModifierFlags::PUBLIC;
            symbol.type_params = lib.type_params.iter().map(|p| (*p).to_string()).collect();
            symbols.add(symbol)
        })
        .collect();

    let find = |symbols: &SymbolTable, name: &str| -> Option<SymbolId> {
        ["java.lang", "java.io", "java.util"]
            .iter()
            .find_map(|pkg| symbols.find_top_level(pkg, name))
    };

    for (lib, &id) in LIBRARY.iter().zip(&ids) {
        let superclass = lib.superclass.and_then(|name| find(symbols, name));
        let interfaces: Vec<SymbolId> = lib
            .interfaces
            .iter()
            .filter_map(|name| find(symbols, name))
            .collect();
        if let Some(symbol) = symbols.get_mut(id) {
            symbol.superclass = superclass;
            symbol.interfaces = interfaces;
        }
        for member in lib.members {
            let name = if member.kind == SymbolKind::Constructor {
                lib.name
            } else {
                member.name
            };
            let mut symbol = Symbol::new(name, member.kind, lib.package);
            symbol.owner = Some(id);
            symbol.flags = ModifierFlags::PUBLIC;
            if member.is_static {
                symbol.flags |= ModifierFlags::STATIC;
            }
            symbol.varargs = member.params.last().is_some_and(|p| p.ends_with("..."));
            symbol.params = member.params.iter().map(|p| (*p).to_string()).collect();
            symbol.value_type = member.value_type.and_then(|name| find(symbols, name));
            symbols.add(symbol);
        }
    }

    ids.first().copied().unwrap_or(SymbolId(0))
}

#[cfg(test)]
#[path = "../tests/library_tests.rs"]
mod library_tests;
