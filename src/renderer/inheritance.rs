use std::borrow::Cow;
use std::collections::HashMap;

use log::debug;

use crate::errors::{Error, Result};
use crate::parser::ast::Block;
use crate::renderer::TemplateSource;
use crate::template::Template;
use crate::utils::sibling_path;

/// Loads every ancestor of `template`, nearest parent first and the template
/// without parent last.
///
/// Parents are always resolved from the directory and extension of `template`,
/// whatever the directory and extension of the intermediate templates.
pub fn load_ancestors<'s>(
    template: &Template,
    source: &'s dyn TemplateSource,
) -> Result<Vec<Cow<'s, Template>>> {
    let mut ancestors: Vec<Cow<'s, Template>> = Vec::new();
    let mut seen = template.path.iter().cloned().collect::<Vec<_>>();
    let mut parent = template.parent.clone();

    while let Some(name) = parent {
        let path = sibling_path(&template.dir, &name, &template.ext);
        if seen.contains(&path) {
            let mut inheritance_chain = vec![template.name.clone()];
            inheritance_chain.extend(ancestors.iter().map(|t| t.name.clone()));
            inheritance_chain.push(path.display().to_string());
            return Err(Error::circular_extend(&template.name, inheritance_chain));
        }

        debug!("Template '{}' extends {}", template.name, path.display());
        let ancestor = source.get_parent(&path)?;
        parent = ancestor.parent.clone();
        seen.push(path);
        ancestors.push(ancestor);
    }

    Ok(ancestors)
}

/// Computes which definition of each block is rendered.
///
/// Going from `template` to the root, each ancestor keeps its own blocks except
/// the ones the template before it in the chain also defines. The result is the
/// root's blocks, each one replaced by its most derived definition.
pub fn compose_blocks<'t>(
    template: &'t Template,
    ancestors: &'t [Cow<'_, Template>],
) -> HashMap<&'t str, &'t Block> {
    let mut table: HashMap<&'t str, &'t Block> =
        template.blocks.iter().map(|(name, block)| (name.as_str(), block)).collect();

    for ancestor in ancestors {
        table = ancestor
            .blocks
            .iter()
            .map(|(name, own)| (name.as_str(), table.get(name.as_str()).copied().unwrap_or(own)))
            .collect();
    }

    table
}
