//! Interactive collection of the values a run needs.

use arldb_backend::{
    artifact::{EntrypointDecl, FieldDecl},
    entry::{ArgType, ConstParam, ContractEnv, EntryArg, EntryPoint, Storage},
    error::InputError,
};
use async_trait::async_trait;

/// Asks the user for a value.
#[async_trait]
pub trait Prompt: Send {
    /// Returns `None` when the user cancels.
    async fn ask(&mut self, question: &str) -> Option<String>;

    /// Tells the user why the last answer was rejected.
    fn reject(&mut self, error: &InputError) {
        warn!("{}", error);
    }
}

/// Asks `question` until `validate` accepts the answer. Returns `None` if the user cancels.
pub async fn collect_validated<P, T, F>(prompt: &mut P, question: &str, mut validate: F) -> Option<T>
where
    P: Prompt + ?Sized,
    F: FnMut(&str) -> Result<T, InputError>,
{
    loop {
        let answer = prompt.ask(question).await?;
        match validate(&answer) {
            Ok(value) => return Some(value),
            Err(err) => prompt.reject(&err),
        }
    }
}

/// Asks for every argument of an entrypoint.
pub async fn collect_entrypoint<P>(prompt: &mut P, decl: &EntrypointDecl) -> Option<EntryPoint>
where
    P: Prompt + ?Sized,
{
    let mut entrypoint = EntryPoint::new(&decl.name);
    for arg in &decl.args {
        let ty = arg.ty.parse::<ArgType>().unwrap_or_else(|never| match never {});
        let question = format!("Value of argument '{}' ({ty}) of '{}'", arg.name, decl.name);
        collect_validated(prompt, &question, |value| entrypoint.add_arg(&arg.name, value, ty.clone())).await?;
    }
    Some(entrypoint)
}

/// Asks for every constant parameter. An empty answer keeps the declared default.
pub async fn collect_const_params<P>(prompt: &mut P, fields: &[FieldDecl]) -> Option<Vec<ConstParam>>
where
    P: Prompt + ?Sized,
{
    let mut params = Vec::with_capacity(fields.len());
    for field in fields {
        let ty = field.ty.parse::<ArgType>().unwrap_or_else(|never| match never {});
        let question = match &field.value {
            Some(default) => format!("Value of constant '{}' ({ty}) [{default}]", field.name),
            None => format!("Value of constant '{}' ({ty})", field.name),
        };
        let arg = collect_validated(prompt, &question, |value| {
            let value = match (value.trim(), &field.value) {
                ("", Some(default)) => default.as_str(),
                _ => value,
            };
            EntryArg::new(&field.name, value, ty.clone())
        })
        .await?;
        params.push(ConstParam::new(&field.name, arg.to_michelson()));
    }
    Some(params)
}

/// Asks for the initial value of every storage field. An empty answer keeps the declared
/// default. If every answer is empty the returned storage is empty, and the run then
/// starts from the compiled initial storage.
pub async fn collect_storage<P>(prompt: &mut P, fields: &[FieldDecl]) -> Option<Storage>
where
    P: Prompt + ?Sized,
{
    let mut storage = Storage::new();
    let mut edited = false;
    for field in fields {
        let ty = field.ty.parse::<ArgType>().unwrap_or_else(|never| match never {});
        let question = match &field.value {
            Some(default) => format!("Initial value of storage '{}' ({ty}) [{default}]", field.name),
            None => format!("Initial value of storage '{}' ({ty})", field.name),
        };
        collect_validated(prompt, &question, |value| {
            let value = match (value.trim(), &field.value) {
                ("", Some(default)) => default.as_str(),
                _ => {
                    edited = true;
                    value
                }
            };
            storage.add_element(&field.name, value, ty.clone())
        })
        .await?;
    }

    if edited {
        Some(storage)
    } else {
        Some(Storage::new())
    }
}

/// Lets the user override the environment. Empty answers keep the current values.
pub async fn collect_env<P>(prompt: &mut P, env: &mut ContractEnv) -> Option<()>
where
    P: Prompt + ?Sized,
{
    type Setter = fn(&mut ContractEnv, &str) -> Result<(), InputError>;
    let setters: [(&str, Setter); 6] = [
        ("now", ContractEnv::set_now),
        ("transferred", ContractEnv::set_transferred),
        ("balance", ContractEnv::set_balance),
        ("level", ContractEnv::set_level),
        ("caller", ContractEnv::set_caller),
        ("source", ContractEnv::set_source),
    ];

    for (name, set) in setters {
        let current = env.constants().into_iter().find(|(n, _)| *n == name).map(|(_, v)| v.to_string());
        let question = format!("Value of '{name}' [{}]", current.unwrap_or_default());
        collect_validated(prompt, &question, |value| {
            if value.trim().is_empty() {
                Ok(())
            } else {
                set(env, value)
            }
        })
        .await?;
    }
    Some(())
}
