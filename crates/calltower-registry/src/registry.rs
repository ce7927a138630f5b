//! SymbolRegistry - in-memory declaration store.
//!
//! This module provides [`SymbolRegistry`], a reference [`SymbolProvider`]
//! backing the tower resolver with packages, imports, local scopes and
//! classifiers.
//!
//! # Storage Model
//!
//! - **Symbols**: every declaration stored in one map by [`SymbolId`]
//! - **Lexical scopes**: packages, imports and local scopes in a vector indexed
//!   by [`ScopeId`]; a package keeps one scope for its whole lifetime
//! - **Classes**: per-classifier member tables plus constructors and companion
//! - **Hierarchy**: supertype edges in a [`ClassHierarchy`] graph, used for
//!   member inheritance and subtyping
//!
//! # Example
//!
//! ```
//! use calltower_core::{FqName, Name, SymbolProvider, Token, TypeRef};
//! use calltower_registry::{ClassDecl, Container, FunctionDecl, SymbolRegistry};
//!
//! let mut registry = SymbolRegistry::new();
//! let app = FqName::from_dotted("app");
//! let a = registry
//!     .register_class(Container::Package(app.clone()), ClassDecl::class("A"))
//!     .unwrap();
//! let foo = registry
//!     .register_function(Container::Class(a), FunctionDecl::new("foo"))
//!     .unwrap();
//!
//! let scope = registry.type_scope(&TypeRef::Class(a)).unwrap();
//! let mut found = Vec::new();
//! registry.process_by_name(scope, &Name::new("foo"), Token::Functions, &mut |id| found.push(id));
//! assert_eq!(found, vec![foo]);
//! ```

use rustc_hash::{FxHashMap, FxHashSet};

use calltower_core::{
    ClassKind, FqName, Name, Param, RegistrationError, ScopeId, ScopeRef, Symbol, SymbolFlags,
    SymbolId, SymbolKind, SymbolProvider, Token, TypeRef, names,
};

use crate::decl::{ClassDecl, Container, FunctionDecl, PropertyDecl};
use crate::hierarchy::ClassHierarchy;

/// Declarations visible under a container, by simple name.
#[derive(Debug, Default)]
struct Declarations {
    /// Functions and properties, in declaration order.
    callables: FxHashMap<Name, Vec<SymbolId>>,
    /// Nested or top-level classifiers.
    classifiers: FxHashMap<Name, SymbolId>,
}

#[derive(Debug)]
enum ScopeKind {
    Package(FqName),
    Local,
    Import {
        explicit: Vec<FqName>,
        star: Vec<FqName>,
    },
}

#[derive(Debug)]
struct LexicalScope {
    kind: ScopeKind,
    declarations: Declarations,
}

impl LexicalScope {
    fn new(kind: ScopeKind) -> Self {
        Self {
            kind,
            declarations: Declarations::default(),
        }
    }
}

#[derive(Debug)]
struct ClassData {
    fq_name: FqName,
    declarations: Declarations,
    constructors: Vec<SymbolId>,
    companion: Option<SymbolId>,
}

impl ClassData {
    fn new(fq_name: FqName) -> Self {
        Self {
            fq_name,
            declarations: Declarations::default(),
            constructors: Vec::new(),
            companion: None,
        }
    }
}

/// In-memory declaration store implementing [`SymbolProvider`].
///
/// Not thread-safe: populate it first, then share it read-only with the
/// resolver.
#[derive(Debug, Default)]
pub struct SymbolRegistry {
    symbols: FxHashMap<SymbolId, Symbol>,
    classes: FxHashMap<SymbolId, ClassData>,
    scopes: Vec<LexicalScope>,
    packages: FxHashMap<FqName, ScopeId>,
    hierarchy: ClassHierarchy,
}

impl SymbolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // ==========================================================================
    // Scopes
    // ==========================================================================

    /// Get or create the top-level scope of a package.
    pub fn package(&mut self, package: &FqName) -> ScopeRef {
        ScopeRef::Lexical(self.package_scope_id(package))
    }

    /// Create an empty local scope.
    pub fn local_scope(&mut self) -> ScopeId {
        self.push_scope(ScopeKind::Local)
    }

    /// Create an import scope.
    ///
    /// `explicit` lists imported declarations (`import a.b.foo`), `star`
    /// lists packages imported whole (`import a.b.*`).
    pub fn import_scope(&mut self, explicit: Vec<FqName>, star: Vec<FqName>) -> ScopeRef {
        ScopeRef::Lexical(self.push_scope(ScopeKind::Import { explicit, star }))
    }

    fn push_scope(&mut self, kind: ScopeKind) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(LexicalScope::new(kind));
        id
    }

    fn package_scope_id(&mut self, package: &FqName) -> ScopeId {
        if let Some(&id) = self.packages.get(package) {
            return id;
        }
        let id = self.push_scope(ScopeKind::Package(package.clone()));
        self.packages.insert(package.clone(), id);
        id
    }

    // ==========================================================================
    // Registration
    // ==========================================================================

    /// Register a class, interface, object or companion object.
    ///
    /// Supertypes must already be registered.
    pub fn register_class(
        &mut self,
        container: Container,
        decl: ClassDecl,
    ) -> Result<SymbolId, RegistrationError> {
        self.validate_container(&container, &decl.name)?;

        let nested = matches!(container, Container::Class(_));
        if matches!(decl.kind, ClassKind::FunctionType { .. }) {
            return Err(invalid(
                &decl.name,
                "function types are created with function_type",
            ));
        }
        if decl.kind == ClassKind::CompanionObject && !nested {
            return Err(invalid(&decl.name, "companion objects must be nested in a class"));
        }
        if decl.flags.contains(SymbolFlags::INNER) && !nested {
            return Err(invalid(&decl.name, "inner classes must be nested in a class"));
        }

        let fq_name = match &container {
            Container::Package(package) => package.child(decl.name.as_str()),
            Container::Class(owner) => self
                .classes
                .get(owner)
                .map(|data| data.fq_name.child(decl.name.as_str()))
                .ok_or_else(|| unknown_owner(&decl.name, *owner))?,
            Container::Local(scope) => {
                FqName::new(vec![format!("<local{}>", scope.0), decl.name.to_string()])
            }
        };

        let id = SymbolId::from_class(&fq_name);
        if self.symbols.contains_key(&id) {
            return Err(duplicate(&decl.name, "classifier"));
        }
        if let Some(missing) = decl
            .supertypes
            .iter()
            .find(|sup| !self.classes.contains_key(sup))
        {
            return Err(invalid(&decl.name, &format!("unknown supertype {missing}")));
        }

        let owner = match container {
            Container::Class(owner) => Some(owner),
            _ => None,
        };
        if decl.kind == ClassKind::CompanionObject
            && let Some(owner) = owner
            && let Some(data) = self.classes.get_mut(&owner)
        {
            if data.companion.is_some() {
                return Err(invalid(&decl.name, "class already has a companion object"));
            }
            data.companion = Some(id);
        }

        self.hierarchy.add_class(id);
        for &sup in &decl.supertypes {
            self.hierarchy.add_supertype(id, sup);
        }
        self.classes.insert(id, ClassData::new(fq_name));
        self.declarations_mut(&container)?
            .classifiers
            .insert(decl.name.clone(), id);
        self.symbols.insert(
            id,
            Symbol {
                id,
                name: decl.name,
                kind: SymbolKind::Class(decl.kind),
                flags: decl.flags,
                owner,
                receiver_type: None,
                params: Vec::new(),
                return_type: TypeRef::Class(id),
            },
        );
        Ok(id)
    }

    /// Register a function.
    pub fn register_function(
        &mut self,
        container: Container,
        decl: FunctionDecl,
    ) -> Result<SymbolId, RegistrationError> {
        self.register_callable(
            container,
            Symbol {
                id: SymbolId::EMPTY,
                name: decl.name,
                kind: SymbolKind::Function,
                flags: decl.flags,
                owner: None,
                receiver_type: decl.receiver,
                params: decl.params,
                return_type: decl.return_type,
            },
        )
    }

    /// Register a property.
    pub fn register_property(
        &mut self,
        container: Container,
        decl: PropertyDecl,
    ) -> Result<SymbolId, RegistrationError> {
        self.register_callable(
            container,
            Symbol {
                id: SymbolId::EMPTY,
                name: decl.name,
                kind: SymbolKind::Property,
                flags: decl.flags,
                owner: None,
                receiver_type: decl.receiver,
                params: Vec::new(),
                return_type: decl.ty,
            },
        )
    }

    /// Register a constructor of `class`. Constructors of inner classes are
    /// inner themselves.
    pub fn register_constructor(
        &mut self,
        class: SymbolId,
        params: Vec<Param>,
    ) -> Result<SymbolId, RegistrationError> {
        let class_symbol = self
            .symbols
            .get(&class)
            .ok_or_else(|| unknown_owner(&Name::new("<init>"), class))?;
        if class_symbol.class_kind() != Some(ClassKind::Class) {
            return Err(invalid(&class_symbol.name, "only classes have constructors"));
        }

        let components: Vec<SymbolId> = params.iter().map(|p| type_component(&p.ty)).collect();
        let id = SymbolId::from_constructor(class, &components);
        if self.symbols.contains_key(&id) {
            return Err(duplicate(&class_symbol.name, "constructor"));
        }

        let symbol = Symbol {
            id,
            name: class_symbol.name.clone(),
            kind: SymbolKind::Constructor,
            flags: class_symbol.flags & SymbolFlags::INNER,
            owner: Some(class),
            receiver_type: None,
            params,
            return_type: TypeRef::Class(class),
        };

        if let Some(data) = self.classes.get_mut(&class) {
            data.constructors.push(id);
        }
        self.symbols.insert(id, symbol);
        Ok(id)
    }

    /// Get or create the function type `(receiver.)(params) -> return_type`.
    ///
    /// The synthesized classifier declares a single `invoke` operator.
    /// Extension function types take the receiver as its first parameter.
    pub fn function_type(
        &mut self,
        receiver: Option<TypeRef>,
        params: &[TypeRef],
        return_type: TypeRef,
    ) -> TypeRef {
        let arity = params.len() + usize::from(receiver.is_some());
        let name = format!("Function{arity}");

        let mut components = vec![receiver.as_ref().map_or(SymbolId::EMPTY, type_component)];
        components.extend(params.iter().map(type_component));
        components.push(type_component(&return_type));
        let id = SymbolId::synthetic(&name, &components);
        if self.classes.contains_key(&id) {
            return TypeRef::Class(id);
        }

        let mut invoke_params = Vec::with_capacity(arity);
        if let Some(receiver) = receiver {
            invoke_params.push(Param::new("receiver", receiver));
        }
        invoke_params.extend(
            params
                .iter()
                .enumerate()
                .map(|(i, ty)| Param::new(format!("p{i}"), *ty)),
        );

        let invoke_name = Name::new(names::INVOKE);
        let invoke_id = SymbolId::from_member(id, names::INVOKE, &[]);
        let mut data = ClassData::new(FqName::new(vec![name.clone()]));
        data.declarations
            .callables
            .insert(invoke_name.clone(), vec![invoke_id]);

        self.symbols.insert(
            id,
            Symbol {
                id,
                name: Name::new(name),
                kind: SymbolKind::Class(ClassKind::FunctionType {
                    is_extension: receiver.is_some(),
                }),
                flags: SymbolFlags::SYNTHETIC,
                owner: None,
                receiver_type: None,
                params: Vec::new(),
                return_type: TypeRef::Class(id),
            },
        );
        self.symbols.insert(
            invoke_id,
            Symbol {
                id: invoke_id,
                name: invoke_name,
                kind: SymbolKind::Function,
                flags: SymbolFlags::OPERATOR,
                owner: Some(id),
                receiver_type: None,
                params: invoke_params,
                return_type,
            },
        );
        self.classes.insert(id, data);
        self.hierarchy.add_class(id);
        TypeRef::Class(id)
    }

    fn register_callable(
        &mut self,
        container: Container,
        mut symbol: Symbol,
    ) -> Result<SymbolId, RegistrationError> {
        self.validate_container(&container, &symbol.name)?;
        if symbol.is_static() && !matches!(container, Container::Class(_)) {
            return Err(invalid(&symbol.name, "static declarations must be class members"));
        }

        let signature = signature(&symbol);
        symbol.id = match &container {
            Container::Package(package) => {
                SymbolId::from_top_level(package, symbol.name.as_str(), &signature)
            }
            Container::Class(owner) => {
                symbol.owner = Some(*owner);
                SymbolId::from_member(*owner, symbol.name.as_str(), &signature)
            }
            Container::Local(scope) => {
                SymbolId::from_local(scope.0, symbol.name.as_str(), &signature)
            }
        };

        if self.symbols.contains_key(&symbol.id) {
            let kind = if symbol.is_property() {
                "property"
            } else {
                "function"
            };
            return Err(duplicate(&symbol.name, kind));
        }

        let id = symbol.id;
        self.declarations_mut(&container)?
            .callables
            .entry(symbol.name.clone())
            .or_default()
            .push(id);
        self.symbols.insert(id, symbol);
        Ok(id)
    }

    fn validate_container(
        &self,
        container: &Container,
        name: &Name,
    ) -> Result<(), RegistrationError> {
        match container {
            Container::Package(_) => Ok(()),
            Container::Class(owner) => {
                if self.classes.contains_key(owner) {
                    Ok(())
                } else {
                    Err(unknown_owner(name, *owner))
                }
            }
            Container::Local(scope) => match self.scopes.get(scope.0 as usize) {
                Some(LexicalScope {
                    kind: ScopeKind::Local,
                    ..
                }) => Ok(()),
                Some(_) => Err(invalid(name, "scope is not a local scope")),
                None => Err(RegistrationError::UnknownScope(*scope)),
            },
        }
    }

    fn declarations_mut(
        &mut self,
        container: &Container,
    ) -> Result<&mut Declarations, RegistrationError> {
        let scope = match container {
            Container::Class(owner) => {
                return self
                    .classes
                    .get_mut(owner)
                    .map(|data| &mut data.declarations)
                    .ok_or_else(|| unknown_owner(&Name::new("<member>"), *owner));
            }
            Container::Package(package) => self.package_scope_id(package),
            Container::Local(scope) => *scope,
        };
        self.scopes
            .get_mut(scope.0 as usize)
            .map(|s| &mut s.declarations)
            .ok_or(RegistrationError::UnknownScope(scope))
    }

    // ==========================================================================
    // Lookup
    // ==========================================================================

    /// Look up any registered symbol.
    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(&id)
    }

    /// Fully-qualified name of a classifier.
    pub fn class_name(&self, class: SymbolId) -> Option<&FqName> {
        self.classes.get(&class).map(|data| &data.fq_name)
    }

    /// Constructors of a class, in registration order.
    pub fn constructors(&self, class: SymbolId) -> &[SymbolId] {
        self.classes
            .get(&class)
            .map(|data| data.constructors.as_slice())
            .unwrap_or_default()
    }

    /// All supertypes of a classifier, nearest first.
    pub fn supertypes(&self, class: SymbolId) -> Vec<SymbolId> {
        self.hierarchy.supertypes(class)
    }

    /// Number of registered symbols, synthesized ones included.
    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    // ==========================================================================
    // Scope Processing
    // ==========================================================================

    fn process_declarations(
        &self,
        declarations: &Declarations,
        name: &Name,
        token: Token,
        statics_only: bool,
        processor: &mut dyn FnMut(SymbolId),
    ) {
        match token {
            Token::Properties | Token::Functions => {
                let wanted = if token == Token::Properties {
                    SymbolKind::Property
                } else {
                    SymbolKind::Function
                };
                if let Some(ids) = declarations.callables.get(name) {
                    for id in ids {
                        if self
                            .symbols
                            .get(id)
                            .is_some_and(|s| s.kind == wanted && (!statics_only || s.is_static()))
                        {
                            processor(*id);
                        }
                    }
                }
                if token == Token::Functions
                    && let Some(class) = declarations.classifiers.get(name)
                {
                    for &ctor in self.constructors(*class) {
                        processor(ctor);
                    }
                }
            }
            Token::Objects => {
                if let Some(&class) = declarations.classifiers.get(name)
                    && self
                        .symbols
                        .get(&class)
                        .and_then(Symbol::class_kind)
                        .is_some_and(|kind| kind.is_object())
                {
                    processor(class);
                }
            }
        }
    }

    /// Own members first, then inherited ones nearest supertype first.
    /// An inherited callable with the signature of one already seen is
    /// overridden and skipped.
    fn process_members(
        &self,
        class: SymbolId,
        name: &Name,
        token: Token,
        processor: &mut dyn FnMut(SymbolId),
    ) {
        let Some(data) = self.classes.get(&class) else {
            return;
        };
        self.process_declarations(&data.declarations, name, token, false, processor);
        if token == Token::Objects {
            return;
        }

        let mut seen: FxHashSet<(SymbolKind, Vec<SymbolId>)> = data
            .declarations
            .callables
            .get(name)
            .into_iter()
            .flatten()
            .filter_map(|id| self.symbols.get(id))
            .map(|s| (s.kind, signature(s)))
            .collect();

        let wanted = if token == Token::Properties {
            SymbolKind::Property
        } else {
            SymbolKind::Function
        };
        for sup in self.hierarchy.supertypes(class) {
            let Some(ids) = self
                .classes
                .get(&sup)
                .and_then(|d| d.declarations.callables.get(name))
            else {
                continue;
            };
            for id in ids {
                let Some(symbol) = self.symbols.get(id) else {
                    continue;
                };
                if symbol.kind != wanted || symbol.is_static() {
                    continue;
                }
                if seen.insert((symbol.kind, signature(symbol))) {
                    processor(*id);
                }
            }
        }
    }

    fn process_lexical(
        &self,
        scope: ScopeId,
        name: &Name,
        token: Token,
        processor: &mut dyn FnMut(SymbolId),
    ) {
        let Some(lexical) = self.scopes.get(scope.0 as usize) else {
            return;
        };
        match &lexical.kind {
            ScopeKind::Package(_) | ScopeKind::Local => {
                self.process_declarations(&lexical.declarations, name, token, false, processor)
            }
            ScopeKind::Import { explicit, star } => {
                for imported in explicit {
                    if imported.short_name() == Some(name.as_str())
                        && let Some(package) = imported.parent()
                        && let Some(declarations) = self.package_declarations(&package)
                    {
                        self.process_declarations(declarations, name, token, false, processor);
                    }
                }
                for package in star {
                    if let Some(declarations) = self.package_declarations(package) {
                        self.process_declarations(declarations, name, token, false, processor);
                    }
                }
            }
        }
    }

    fn package_declarations(&self, package: &FqName) -> Option<&Declarations> {
        let id = self.packages.get(package)?;
        self.scopes.get(id.0 as usize).map(|s| &s.declarations)
    }

    fn is_object(&self, class: SymbolId) -> bool {
        self.symbols
            .get(&class)
            .and_then(Symbol::class_kind)
            .is_some_and(|kind| kind.is_object())
    }
}

impl SymbolProvider for SymbolRegistry {
    fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(&id)
    }

    fn process_by_name(
        &self,
        scope: ScopeRef,
        name: &Name,
        token: Token,
        processor: &mut dyn FnMut(SymbolId),
    ) {
        match scope {
            ScopeRef::Lexical(id) => self.process_lexical(id, name, token, processor),
            ScopeRef::Members(class) => self.process_members(class, name, token, processor),
            ScopeRef::Static(class) => {
                if let Some(data) = self.classes.get(&class) {
                    self.process_declarations(&data.declarations, name, token, true, processor);
                }
            }
            ScopeRef::Qualifier(class) => {
                if let Some(data) = self.classes.get(&class) {
                    self.process_declarations(&data.declarations, name, token, true, processor);
                }
                if self.is_object(class) {
                    self.process_members(class, name, token, processor);
                }
                if let Some(companion) = self.companion_object(class) {
                    self.process_members(companion, name, token, processor);
                }
            }
        }
    }

    fn type_scope(&self, ty: &TypeRef) -> Option<ScopeRef> {
        ty.classifier()
            .filter(|class| self.classes.contains_key(class))
            .map(ScopeRef::Members)
    }

    fn companion_object(&self, class: SymbolId) -> Option<SymbolId> {
        self.classes.get(&class).and_then(|data| data.companion)
    }

    fn package_scope(&self, package: &FqName) -> Option<ScopeRef> {
        self.packages.get(package).map(|&id| ScopeRef::Lexical(id))
    }

    fn is_subtype(&self, sub: &TypeRef, sup: &TypeRef) -> bool {
        match (sub.classifier(), sup.classifier()) {
            (Some(a), Some(b)) => self.hierarchy.is_subclass(a, b),
            _ => true,
        }
    }

    fn is_extension_function_type(&self, ty: &TypeRef) -> bool {
        ty.classifier()
            .and_then(|class| self.symbols.get(&class))
            .and_then(Symbol::class_kind)
            .is_some_and(|kind| matches!(kind, ClassKind::FunctionType { is_extension: true }))
    }
}

// ==========================================================================
// Helpers
// ==========================================================================

fn type_component(ty: &TypeRef) -> SymbolId {
    ty.classifier().unwrap_or(SymbolId::EMPTY)
}

/// Id components that tell overloads apart: a property marker or the
/// receiver, followed by the parameter types.
fn signature(symbol: &Symbol) -> Vec<SymbolId> {
    let receiver = symbol
        .receiver_type
        .as_ref()
        .map_or(SymbolId::EMPTY, type_component);
    if symbol.is_property() {
        return vec![SymbolId::synthetic("property", &[]), receiver];
    }
    let mut components = Vec::with_capacity(symbol.params.len() + 1);
    components.push(receiver);
    components.extend(symbol.params.iter().map(|p| type_component(&p.ty)));
    components
}

fn invalid(name: &Name, reason: &str) -> RegistrationError {
    RegistrationError::InvalidDeclaration {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

fn duplicate(name: &Name, kind: &str) -> RegistrationError {
    RegistrationError::DuplicateSymbol {
        name: name.to_string(),
        kind: kind.to_string(),
    }
}

fn unknown_owner(name: &Name, owner: SymbolId) -> RegistrationError {
    RegistrationError::UnknownOwner {
        name: name.to_string(),
        owner,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(registry: &SymbolRegistry, scope: ScopeRef, name: &str, token: Token) -> Vec<SymbolId> {
        let mut found = Vec::new();
        registry.process_by_name(scope, &Name::new(name), token, &mut |id| found.push(id));
        found
    }

    fn app() -> FqName {
        FqName::from_dotted("app")
    }

    #[test]
    fn new_registry_is_empty() {
        let registry = SymbolRegistry::new();
        assert_eq!(registry.symbol_count(), 0);
        assert!(registry.package_scope(&app()).is_none());
    }

    #[test]
    fn tokens_separate_functions_and_properties() {
        let mut registry = SymbolRegistry::new();
        let scope = registry.package(&app());
        let f = registry
            .register_function(Container::Package(app()), FunctionDecl::new("x"))
            .unwrap();
        let p = registry
            .register_property(Container::Package(app()), PropertyDecl::new("x", TypeRef::Unknown))
            .unwrap();
        assert_ne!(f, p);

        assert_eq!(collect(&registry, scope, "x", Token::Functions), vec![f]);
        assert_eq!(collect(&registry, scope, "x", Token::Properties), vec![p]);
        assert!(collect(&registry, scope, "x", Token::Objects).is_empty());
    }

    #[test]
    fn duplicate_function_is_rejected() {
        let mut registry = SymbolRegistry::new();
        registry
            .register_function(Container::Package(app()), FunctionDecl::new("f"))
            .unwrap();
        let err = registry
            .register_function(Container::Package(app()), FunctionDecl::new("f"))
            .unwrap_err();
        assert!(matches!(err, RegistrationError::DuplicateSymbol { .. }));
    }

    #[test]
    fn overloads_by_parameter_type() {
        let mut registry = SymbolRegistry::new();
        let a = registry
            .register_class(Container::Package(app()), ClassDecl::class("A"))
            .unwrap();
        let f1 = registry
            .register_function(Container::Package(app()), FunctionDecl::new("f"))
            .unwrap();
        let f2 = registry
            .register_function(
                Container::Package(app()),
                FunctionDecl::new("f").param("a", TypeRef::Class(a)),
            )
            .unwrap();
        let scope = registry.package(&app());
        assert_eq!(collect(&registry, scope, "f", Token::Functions), vec![f1, f2]);
    }

    #[test]
    fn inherited_members_skip_overridden() {
        let mut registry = SymbolRegistry::new();
        let base = registry
            .register_class(Container::Package(app()), ClassDecl::class("Base"))
            .unwrap();
        let derived = registry
            .register_class(
                Container::Package(app()),
                ClassDecl::class("Derived").extends(base),
            )
            .unwrap();
        let base_foo = registry
            .register_function(Container::Class(base), FunctionDecl::new("foo"))
            .unwrap();
        let base_foo_int = registry
            .register_function(
                Container::Class(base),
                FunctionDecl::new("foo").param("x", TypeRef::Class(base)),
            )
            .unwrap();
        let derived_foo = registry
            .register_function(Container::Class(derived), FunctionDecl::new("foo"))
            .unwrap();

        let found = collect(&registry, ScopeRef::Members(derived), "foo", Token::Functions);
        assert_eq!(found, vec![derived_foo, base_foo_int]);
        assert!(!found.contains(&base_foo));
        assert!(registry.is_subtype(&TypeRef::Class(derived), &TypeRef::Class(base)));
        assert!(!registry.is_subtype(&TypeRef::Class(base), &TypeRef::Class(derived)));
    }

    #[test]
    fn static_scope_and_nested_constructors() {
        let mut registry = SymbolRegistry::new();
        let outer = registry
            .register_class(Container::Package(app()), ClassDecl::class("Outer"))
            .unwrap();
        let nested = registry
            .register_class(Container::Class(outer), ClassDecl::class("Nested"))
            .unwrap();
        let inner = registry
            .register_class(Container::Class(outer), ClassDecl::class("Inner").inner())
            .unwrap();
        let nested_ctor = registry.register_constructor(nested, vec![]).unwrap();
        let inner_ctor = registry.register_constructor(inner, vec![]).unwrap();
        let s = registry
            .register_function(
                Container::Class(outer),
                FunctionDecl::new("s").flags(SymbolFlags::STATIC),
            )
            .unwrap();
        registry
            .register_function(Container::Class(outer), FunctionDecl::new("m"))
            .unwrap();

        assert!(registry.get(inner_ctor).unwrap().is_inner());
        assert!(registry.get(nested_ctor).unwrap().is_static_like());
        assert_eq!(
            collect(&registry, ScopeRef::Static(outer), "Nested", Token::Functions),
            vec![nested_ctor]
        );
        assert_eq!(
            collect(&registry, ScopeRef::Static(outer), "s", Token::Functions),
            vec![s]
        );
        assert!(collect(&registry, ScopeRef::Static(outer), "m", Token::Functions).is_empty());
        assert_eq!(
            collect(&registry, ScopeRef::Members(outer), "Inner", Token::Functions),
            vec![inner_ctor]
        );
    }

    #[test]
    fn qualifier_includes_companion_members() {
        let mut registry = SymbolRegistry::new();
        let a = registry
            .register_class(Container::Package(app()), ClassDecl::class("A"))
            .unwrap();
        let companion = registry
            .register_class(Container::Class(a), ClassDecl::companion("Companion"))
            .unwrap();
        let create = registry
            .register_function(Container::Class(companion), FunctionDecl::new("create"))
            .unwrap();

        assert_eq!(registry.companion_object(a), Some(companion));
        assert_eq!(
            collect(&registry, ScopeRef::Qualifier(a), "create", Token::Functions),
            vec![create]
        );
        assert_eq!(
            collect(&registry, ScopeRef::Members(a), "Companion", Token::Objects),
            vec![companion]
        );

        let err = registry
            .register_class(Container::Class(a), ClassDecl::companion("Other"))
            .unwrap_err();
        assert!(matches!(err, RegistrationError::InvalidDeclaration { .. }));
    }

    #[test]
    fn imports_resolve_through_packages() {
        let mut registry = SymbolRegistry::new();
        let lib = FqName::from_dotted("lib");
        let util = FqName::from_dotted("util");
        let f = registry
            .register_function(Container::Package(lib.clone()), FunctionDecl::new("f"))
            .unwrap();
        registry
            .register_function(Container::Package(lib.clone()), FunctionDecl::new("g"))
            .unwrap();
        let h = registry
            .register_function(Container::Package(util.clone()), FunctionDecl::new("h"))
            .unwrap();

        let explicit = registry.import_scope(vec![lib.child("f")], vec![]);
        let star = registry.import_scope(vec![], vec![util]);

        assert_eq!(collect(&registry, explicit, "f", Token::Functions), vec![f]);
        assert!(collect(&registry, explicit, "g", Token::Functions).is_empty());
        assert_eq!(collect(&registry, star, "h", Token::Functions), vec![h]);
    }

    #[test]
    fn local_scope_must_exist() {
        let mut registry = SymbolRegistry::new();
        let err = registry
            .register_property(
                Container::Local(ScopeId(3)),
                PropertyDecl::new("x", TypeRef::Unknown),
            )
            .unwrap_err();
        assert_eq!(err, RegistrationError::UnknownScope(ScopeId(3)));

        let local = registry.local_scope();
        let x = registry
            .register_property(Container::Local(local), PropertyDecl::new("x", TypeRef::Unknown))
            .unwrap();
        assert_eq!(
            collect(&registry, ScopeRef::Lexical(local), "x", Token::Properties),
            vec![x]
        );
    }

    #[test]
    fn static_outside_class_is_rejected() {
        let mut registry = SymbolRegistry::new();
        let err = registry
            .register_function(
                Container::Package(app()),
                FunctionDecl::new("s").flags(SymbolFlags::STATIC),
            )
            .unwrap_err();
        assert!(matches!(err, RegistrationError::InvalidDeclaration { .. }));
    }

    #[test]
    fn function_types_declare_invoke() {
        let mut registry = SymbolRegistry::new();
        let a = registry
            .register_class(Container::Package(app()), ClassDecl::class("A"))
            .unwrap();
        let plain = registry.function_type(None, &[TypeRef::Class(a)], TypeRef::Unknown);
        let again = registry.function_type(None, &[TypeRef::Class(a)], TypeRef::Unknown);
        let ext = registry.function_type(Some(TypeRef::Class(a)), &[], TypeRef::Unknown);
        assert_eq!(plain, again);
        assert_ne!(plain, ext);

        assert!(!registry.is_extension_function_type(&plain));
        assert!(registry.is_extension_function_type(&ext));

        let scope = registry.type_scope(&ext).unwrap();
        let invoke = collect(&registry, scope, names::INVOKE, Token::Functions);
        assert_eq!(invoke.len(), 1);
        let symbol = registry.get(invoke[0]).unwrap();
        assert_eq!(symbol.params.len(), 1);
        assert_eq!(symbol.params[0].ty, TypeRef::Class(a));
        assert!(symbol.flags.contains(SymbolFlags::OPERATOR));
    }
}
