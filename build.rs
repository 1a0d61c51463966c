use vergen_gitcl::{Emitter, Gitcl};

// Embeds VERGEN_GIT_{BRANCH,SHA,DIRTY} for `version::version_string`.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let gitcl = Gitcl::builder().branch(true).sha(true).dirty(true).build();

    Emitter::default().add_instructions(&gitcl)?.emit()?;

    Ok(())
}
