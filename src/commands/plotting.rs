//! Plot queue and PCA commands.

use crate::error::ShellError;
use crate::project::plots::PlotRequest;
use crate::session::Session;
use crate::shell::action::PcaStep;
use crate::shell::envelope::Envelope;

pub fn plot(session: &mut Session, request: &PlotRequest, show: bool) -> Result<Envelope, ShellError> {
    let project = session.store.current_project_mut()?;
    Ok(Envelope::from(project.plot(request, show)?))
}

pub fn show(session: &mut Session) -> Result<Envelope, ShellError> {
    Ok(Envelope::text(session.store.current_project_mut()?.show()?))
}

pub fn pca(session: &mut Session, step: PcaStep, show: bool) -> Result<Envelope, ShellError> {
    let project = session.store.current_project_mut()?;
    match step {
        PcaStep::Run => Ok(Envelope::table(project.run_pca()?)),
        PcaStep::Plot => Ok(Envelope::from(project.plot_pca(show)?)),
    }
}
