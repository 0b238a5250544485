pub struct CandidateConfirmation<'a> {
    pub candidate_name: &'a str,
    pub position: &'a str,
    pub company_name: &'a str,
}

pub struct HrAlert<'a> {
    pub candidate_name: &'a str,
    pub candidate_email: &'a str,
    pub position: &'a str,
    pub resume_url: &'a str,
    pub company_name: &'a str,
    pub received_at: &'a str,
}

const STYLE: &str = "body { font-family: Arial, sans-serif; line-height: 1.6; color: #333; }
        .container { max-width: 600px; margin: 0 auto; padding: 20px; }
        .content { padding: 20px; background-color: #f9f9f9; }
        .footer { padding: 20px; text-align: center; color: #666; font-size: 12px; }";

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

impl CandidateConfirmation<'_> {
    pub fn subject(&self) -> String {
        format!("Thank you for your application to {}", self.company_name)
    }

    pub fn render(&self) -> String {
        let name = escape_html(self.candidate_name);
        let position = escape_html(self.position);
        let company = escape_html(self.company_name);
        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>Thank you for your application</title>
    <style>
        {style}
        .header {{ background-color: #4f46e5; color: white; padding: 20px; text-align: center; }}
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <div class="logo">{company}</div>
            <h1>Thank You for Your Application!</h1>
        </div>
        <div class="content">
            <h2>Dear {name},</h2>
            <p>Thank you for your interest in the <strong>{position}</strong> position at {company}.</p>
            <p>We have received your application and our team will review it carefully. If your qualifications match our requirements, we will contact you within the next few business days to discuss the next steps.</p>
            <p><strong>What happens next?</strong></p>
            <ul>
                <li>Our HR team will review your application</li>
                <li>If selected, you'll receive an email to schedule an interview</li>
                <li>We'll keep you updated throughout the process</li>
            </ul>
            <p>Best regards,<br>The {company} Careers Team</p>
        </div>
        <div class="footer">
            <p>&copy; {company}. All rights reserved.</p>
            <p>This is an automated message. Please do not reply to this email.</p>
        </div>
    </div>
</body>
</html>"#,
            style = STYLE,
            company = company,
            name = name,
            position = position,
        )
    }
}

impl HrAlert<'_> {
    pub fn subject(&self) -> String {
        format!(
            "New Job Application: {} for {}",
            self.candidate_name, self.position
        )
    }

    pub fn render(&self) -> String {
        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>New Job Application</title>
    <style>
        {style}
        .header {{ background-color: #dc2626; color: white; padding: 20px; text-align: center; }}
        .info-box {{ background-color: #e5e7eb; padding: 15px; margin: 10px 0; border-radius: 5px; }}
        .button {{ background-color: #4f46e5; color: white; padding: 10px 20px; text-decoration: none; border-radius: 5px; display: inline-block; margin: 10px 0; }}
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>New Job Application Received</h1>
        </div>
        <div class="content">
            <h2>Application Details</h2>
            <div class="info-box">
                <p><strong>Candidate Name:</strong> {name}</p>
                <p><strong>Email:</strong> {email}</p>
                <p><strong>Position:</strong> {position}</p>
                <p><strong>Application Date:</strong> {received_at}</p>
            </div>
            <p><strong>Resume:</strong></p>
            <a href="{resume_url}" class="button">Download Resume</a>
            <p>Please review the application and update the candidate's status in the system.</p>
        </div>
        <div class="footer">
            <p>&copy; {company} HR System. All rights reserved.</p>
        </div>
    </div>
</body>
</html>"#,
            style = STYLE,
            name = escape_html(self.candidate_name),
            email = escape_html(self.candidate_email),
            position = escape_html(self.position),
            received_at = escape_html(self.received_at),
            resume_url = escape_html(self.resume_url),
            company = escape_html(self.company_name),
        )
    }
}
